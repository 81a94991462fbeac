//! Draw displayed frames into a viewport-sized RGBA image.

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::consts::BACKGROUND_GRAY;
use crate::session::{DisplayedFrame, ViewerSession};
use crate::viewport::ViewState;

/// Snapshot of what a session currently shows.
pub fn compose_session(session: &ViewerSession) -> RgbaImage {
    compose_frames(session.displayed_frames().values(), &session.view())
}

/// Blit `frames` in order (later frames on top) at their positions under
/// `view`, nearest-neighbour, alpha-blended over a grey background.
pub fn compose_frames<'a>(
    frames: impl IntoIterator<Item = &'a DisplayedFrame>,
    view: &ViewState,
) -> RgbaImage {
    let bg = Rgba([BACKGROUND_GRAY, BACKGROUND_GRAY, BACKGROUND_GRAY, 255]);
    let mut out = RgbaImage::from_pixel(view.viewport_width, view.viewport_height, bg);
    for frame in frames {
        blit(&mut out, frame, view);
    }
    out
}

fn blit(out: &mut RgbaImage, frame: &DisplayedFrame, view: &ViewState) {
    let Some(dst) = frame.screen_rect_in(view) else {
        return;
    };
    let buf = &frame.buffer;
    let (bw, bh) = (buf.width(), buf.height());
    if bw == 0 || bh == 0 || dst.width() <= 0.0 || dst.height() <= 0.0 {
        return;
    }
    let (ow, oh) = (out.width() as usize, out.height() as usize);
    let x_start = dst.x0.floor().max(0.0) as usize;
    let x_end = (dst.x1.ceil().min(ow as f64)).max(0.0) as usize;
    let y_start = dst.y0.floor().max(0.0) as usize;
    let y_end = (dst.y1.ceil().min(oh as f64)).max(0.0) as usize;
    if x_start >= x_end || y_start >= y_end {
        return;
    }
    let sx = bw as f64 / dst.width();
    let sy = bh as f64 / dst.height();

    out.par_chunks_mut(ow * 4)
        .enumerate()
        .skip(y_start)
        .take(y_end - y_start)
        .for_each(|(y, row)| {
            let v = ((y as f64 + 0.5 - dst.y0) * sy).floor();
            if v < 0.0 || v >= bh as f64 {
                return;
            }
            let v = v as usize;
            for x in x_start..x_end {
                let u = ((x as f64 + 0.5 - dst.x0) * sx).floor();
                if u < 0.0 || u >= bw as f64 {
                    continue;
                }
                let src = buf.rgba(u as usize, v);
                let px = &mut row[x * 4..x * 4 + 4];
                blend(px, src);
            }
        });
}

/// Source-over with straight alpha; the destination stays opaque.
fn blend(dst: &mut [u8], src: [u8; 4]) {
    let a = u32::from(src[3]);
    for c in 0..3 {
        let mixed = (u32::from(src[c]) * a + u32::from(dst[c]) * (255 - a) + 127) / 255;
        dst[c] = mixed as u8;
    }
}
