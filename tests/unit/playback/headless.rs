use super::*;
use crate::{
    assets::animated_gif::GifFrameSource,
    foundation::core::{FrameIndex, PixelRect},
    frame::meta::{DisposalMethod, FrameMeta},
};

const RED: Rgba8Premul = Rgba8Premul {
    r: 255,
    g: 0,
    b: 0,
    a: 255,
};
const GREEN: Rgba8Premul = Rgba8Premul {
    r: 0,
    g: 255,
    b: 0,
    a: 255,
};

fn source(delays: &[u32]) -> GifFrameSource {
    let canvas = Canvas {
        width: 4,
        height: 4,
    };
    let frames = delays
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            let color = if i % 2 == 0 { RED } else { GREEN };
            (
                Bitmap::solid(4, 4, color),
                FrameMeta::new(canvas.rect(), d, DisposalMethod::NoDisposal),
            )
        })
        .collect();
    GifFrameSource::from_frames(canvas, Rgba8Premul::transparent(), frames).unwrap()
}

#[test]
fn start_paints_first_frame_and_arms_clock() {
    let mut p = Player::new(source(&[40, 60]), ComposerOpts::default());
    p.start().unwrap();
    assert_eq!(p.next_delay_ms(), Some(40));

    assert!(p.paint().unwrap());
    assert_eq!(p.framebuffer(), &Bitmap::solid(4, 4, RED));
    assert!(!p.paint().unwrap());
}

#[test]
fn advance_fires_only_at_the_deadline() {
    let mut p = Player::new(source(&[40, 60]), ComposerOpts::default());
    p.start().unwrap();
    p.paint().unwrap();

    assert!(!p.advance(39).unwrap());
    assert!(p.advance(1).unwrap());
    assert_eq!(p.next_delay_ms(), Some(60));
    assert!(p.paint().unwrap());
    assert_eq!(p.framebuffer(), &Bitmap::solid(4, 4, GREEN));
}

#[test]
fn static_image_has_no_next_tick() {
    let mut p = Player::new(source(&[40]), ComposerOpts::default());
    p.start().unwrap();
    assert_eq!(p.next_delay_ms(), None);
    assert!(p.paint().unwrap());
}

#[test]
fn unavailable_device_fails_start() {
    let mut p = Player::new(source(&[40, 60]), ComposerOpts::default());
    p.host_mut().set_device_available(false);
    assert!(matches!(p.start(), Err(ComposeError::Allocation(_))));
    assert!(!p.composer().has_surface());
    assert_eq!(p.next_delay_ms(), None);

    p.host_mut().set_device_available(true);
    p.start().unwrap();
    assert!(p.composer().has_surface());
}

#[test]
fn device_loss_recreates_surface_and_restarts_loop() {
    let mut p = Player::new(source(&[40, 60, 80]), ComposerOpts::default());
    p.start().unwrap();
    assert!(p.advance(40).unwrap());
    assert_eq!(p.composer().frame_index(), FrameIndex(2));
    assert_eq!(p.host().surfaces_created(), 1);

    p.lose_device();
    assert!(p.advance(60).unwrap());

    assert_eq!(p.host().surfaces_created(), 2);
    assert_eq!(p.composer().frame_index(), FrameIndex(1));
    assert_eq!(p.next_delay_ms(), Some(40));
    assert!(p.paint().unwrap());
    assert_eq!(p.framebuffer(), &Bitmap::solid(4, 4, RED));
}

#[test]
fn paint_shows_background_around_partial_frame() {
    let canvas = Canvas {
        width: 2,
        height: 1,
    };
    let frames = vec![(
        Bitmap::solid(1, 1, GREEN),
        FrameMeta::new(PixelRect::new(1, 0, 1, 1), 10, DisposalMethod::NoDisposal),
    )];
    let src = GifFrameSource::from_frames(canvas, RED, frames).unwrap();
    let mut p = Player::new(src, ComposerOpts::default());
    p.start().unwrap();
    p.paint().unwrap();
    assert_eq!(p.framebuffer().pixel(0, 0), Some(RED));
    assert_eq!(p.framebuffer().pixel(1, 0), Some(GREEN));
}

#[test]
fn device_loss_before_restore_previous_frame_recovers() {
    let canvas = Canvas {
        width: 4,
        height: 4,
    };
    let frames = [
        (RED, DisposalMethod::NoDisposal),
        (GREEN, DisposalMethod::RestorePrevious),
        (RED, DisposalMethod::NoDisposal),
    ]
    .into_iter()
    .map(|(color, disposal)| {
        (
            Bitmap::solid(4, 4, color),
            FrameMeta::new(canvas.rect(), 20, disposal),
        )
    })
    .collect();
    let src = GifFrameSource::from_frames(canvas, Rgba8Premul::transparent(), frames).unwrap();
    let mut p = Player::new(src, ComposerOpts::default());
    p.start().unwrap();
    p.lose_device();

    assert!(p.advance(20).unwrap());
    assert_eq!(p.host().surfaces_created(), 2);
    assert_eq!(p.composer().frame_index(), FrameIndex(1));

    // The restore-previous frame now composes and disposes normally.
    assert!(p.advance(20).unwrap());
    assert_eq!(p.composer().frame_index(), FrameIndex(2));
    assert!(p.paint().unwrap());
    assert_eq!(p.framebuffer(), &Bitmap::solid(4, 4, GREEN));

    assert!(p.advance(20).unwrap());
    assert_eq!(p.composer().frame_index(), FrameIndex(0));
    assert!(!p.composer().is_stalled());
}

#[test]
fn zero_failure_limit_keeps_playing() {
    let opts = ComposerOpts {
        max_consecutive_failures: Some(0),
        ..ComposerOpts::default()
    };
    let mut p = Player::new(source(&[40, 60]), opts);
    p.start().unwrap();
    assert_eq!(p.next_delay_ms(), Some(40));
    assert!(!p.composer().is_stalled());
    assert!(p.advance(40).unwrap());
    assert_eq!(p.next_delay_ms(), Some(60));
}
