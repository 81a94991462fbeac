use anyhow::Result;
use clap::Args;

use super::view::{open_view, ViewArgs};
use crate::summary::print_frame_plan;

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub view: ViewArgs,
}

pub fn run(args: &PlanArgs) -> Result<()> {
    let (session, reporter) = open_view(&args.view)?;
    let plan = session.controller().plan_frame();
    let centre = session.controller().viewport_center();
    let status = session.status_line(centre);
    print_frame_plan(session.controller(), &plan, status.as_deref());
    drop(session);
    let _ = reporter.join();
    Ok(())
}
