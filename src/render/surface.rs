use crate::{
    foundation::core::{Canvas, PixelRect, Rgba8Premul},
    foundation::error::ComposeResult,
    render::bitmap::Bitmap,
};

/// Accumulating drawing target that frames are composed onto (the GIF "logical screen").
///
/// Drawing calls (`clear`, `push_clip`, `pop_clip`, `draw_bitmap`) belong inside a
/// `begin_draw`/`end_draw` batch. Like a GPU render target, they do not report errors directly:
/// problems surface from `end_draw`, and a failed `end_draw` must be treated by the host as
/// possible device loss.
pub trait CompositeSurface {
    /// Surface dimensions.
    fn canvas(&self) -> Canvas;

    /// Open a drawing batch.
    fn begin_draw(&mut self);

    /// Close the current batch, reporting anything that went wrong inside it.
    fn end_draw(&mut self) -> ComposeResult<()>;

    /// Replace every pixel inside the current clip (or the whole surface) with `color`.
    fn clear(&mut self, color: Rgba8Premul);

    /// Restrict subsequent drawing to `rect`, intersected with any active clip.
    fn push_clip(&mut self, rect: PixelRect);

    /// Remove the innermost clip.
    fn pop_clip(&mut self);

    /// Draw `bitmap` source-over with its top-left corner at `dest`'s origin, limited to `dest`.
    fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: PixelRect);

    /// Allocate a bitmap with the same size and format as the surface.
    fn create_compatible_bitmap(&self) -> ComposeResult<Bitmap>;

    /// Copy the whole surface into `target`.
    fn copy_to(&self, target: &mut Bitmap) -> ComposeResult<()>;

    /// Overwrite the whole surface with `source`.
    fn copy_from(&mut self, source: &Bitmap) -> ComposeResult<()>;

    /// Snapshot of everything composed so far, ready to be drawn by the host.
    fn current_bitmap(&self) -> ComposeResult<Bitmap>;
}

/// The host's destination surface (window back buffer, printer page, ...).
pub trait DrawTarget {
    /// Draw `src` (or the whole bitmap) of `bitmap` scaled into `dest`.
    fn draw_bitmap(
        &mut self,
        bitmap: &Bitmap,
        dest: PixelRect,
        src: Option<PixelRect>,
    ) -> ComposeResult<()>;
}
