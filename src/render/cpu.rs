use crate::{
    foundation::core::{Canvas, PixelRect, Rgba8Premul},
    foundation::error::{ComposeError, ComposeResult},
    render::{
        bitmap::Bitmap,
        blend,
        surface::{CompositeSurface, DrawTarget},
    },
};

/// Software composite surface backed by a `vello_cpu` pixmap (premultiplied RGBA8).
pub struct CpuSurface {
    canvas: Canvas,
    pixmap: vello_cpu::Pixmap,
    drawing: bool,
    // Effective clips, each already intersected with its parent.
    clips: Vec<PixelRect>,
    batch_error: Option<String>,
    lost: bool,
}

impl CpuSurface {
    /// Allocate a transparent surface covering `canvas`.
    pub fn new(canvas: Canvas) -> ComposeResult<Self> {
        if canvas.is_empty() {
            return Err(ComposeError::allocation(format!(
                "surface must be non-empty, got {}x{}",
                canvas.width, canvas.height
            )));
        }
        let w: u16 = canvas.width.try_into().map_err(|_| {
            ComposeError::allocation(format!("surface width exceeds u16: {}", canvas.width))
        })?;
        let h: u16 = canvas.height.try_into().map_err(|_| {
            ComposeError::allocation(format!("surface height exceeds u16: {}", canvas.height))
        })?;

        Ok(Self {
            canvas,
            pixmap: vello_cpu::Pixmap::new(w, h),
            drawing: false,
            clips: Vec::new(),
            batch_error: None,
            lost: false,
        })
    }

    /// Mark the surface as lost; `end_draw`, copies and allocations report device loss from now on.
    pub fn lose_device(&mut self) {
        self.lost = true;
    }

    /// Return `true` once [`CpuSurface::lose_device`] was called.
    pub fn is_lost(&self) -> bool {
        self.lost
    }

    fn active_clip(&self) -> PixelRect {
        self.clips.last().copied().unwrap_or(self.canvas.rect())
    }

    fn in_batch(&mut self, op: &str) -> bool {
        if !self.drawing {
            self.batch_error
                .get_or_insert_with(|| format!("{op} called outside begin_draw/end_draw"));
        }
        self.drawing
    }

    fn check_usable(&self) -> ComposeResult<()> {
        if self.lost {
            return Err(ComposeError::device_lost("cpu surface was lost"));
        }
        Ok(())
    }

    fn check_size(&self, bitmap: &Bitmap) -> ComposeResult<()> {
        if bitmap.size() != self.canvas {
            return Err(ComposeError::validation(format!(
                "bitmap {}x{} does not match surface {}x{}",
                bitmap.width(),
                bitmap.height(),
                self.canvas.width,
                self.canvas.height
            )));
        }
        Ok(())
    }

    fn row_range(&self, y: u32, x: u32, len: u32) -> std::ops::Range<usize> {
        let start = ((y as usize) * (self.canvas.width as usize) + (x as usize)) * 4;
        start..start + (len as usize) * 4
    }
}

impl CompositeSurface for CpuSurface {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn begin_draw(&mut self) {
        if self.drawing {
            self.batch_error
                .get_or_insert_with(|| "begin_draw called twice".to_string());
        }
        self.drawing = true;
    }

    fn end_draw(&mut self) -> ComposeResult<()> {
        if !self.drawing {
            return Err(ComposeError::device_lost("end_draw without begin_draw"));
        }
        self.drawing = false;
        let unbalanced = !self.clips.is_empty();
        self.clips.clear();
        self.check_usable()?;
        if let Some(msg) = self.batch_error.take() {
            return Err(ComposeError::device_lost(msg));
        }
        if unbalanced {
            return Err(ComposeError::device_lost("clip stack not empty at end_draw"));
        }
        Ok(())
    }

    fn clear(&mut self, color: Rgba8Premul) {
        if !self.in_batch("clear") {
            return;
        }
        let area = self.active_clip();
        if area.is_empty() {
            return;
        }
        let px = color.to_array();
        for y in area.y..area.bottom() {
            let range = self.row_range(y, area.x, area.width);
            for d in self.pixmap.data_as_u8_slice_mut()[range].chunks_exact_mut(4) {
                d.copy_from_slice(&px);
            }
        }
    }

    fn push_clip(&mut self, rect: PixelRect) {
        if !self.in_batch("push_clip") {
            return;
        }
        let clip = self.active_clip().intersect(rect);
        self.clips.push(clip);
    }

    fn pop_clip(&mut self) {
        if !self.in_batch("pop_clip") {
            return;
        }
        if self.clips.pop().is_none() {
            self.batch_error
                .get_or_insert_with(|| "pop_clip without push_clip".to_string());
        }
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: PixelRect) {
        if !self.in_batch("draw_bitmap") {
            return;
        }
        let placed = PixelRect::new(
            dest.x,
            dest.y,
            dest.width.min(bitmap.width()),
            dest.height.min(bitmap.height()),
        );
        let area = placed.intersect(self.active_clip());
        if area.is_empty() {
            return;
        }
        for y in area.y..area.bottom() {
            let src = bitmap.row(y - dest.y, area.x - dest.x, area.width);
            let range = self.row_range(y, area.x, area.width);
            blend::over_row(&mut self.pixmap.data_as_u8_slice_mut()[range], src);
        }
    }

    fn create_compatible_bitmap(&self) -> ComposeResult<Bitmap> {
        self.check_usable()?;
        Ok(Bitmap::new(self.canvas.width, self.canvas.height))
    }

    fn copy_to(&self, target: &mut Bitmap) -> ComposeResult<()> {
        self.check_usable()?;
        self.check_size(target)?;
        target
            .data_mut()
            .copy_from_slice(self.pixmap.data_as_u8_slice());
        Ok(())
    }

    fn copy_from(&mut self, source: &Bitmap) -> ComposeResult<()> {
        self.check_usable()?;
        self.check_size(source)?;
        self.pixmap
            .data_as_u8_slice_mut()
            .copy_from_slice(source.data());
        Ok(())
    }

    fn current_bitmap(&self) -> ComposeResult<Bitmap> {
        self.check_usable()?;
        Bitmap::from_premul(
            self.canvas.width,
            self.canvas.height,
            self.pixmap.data_as_u8_slice().to_vec(),
        )
    }
}

/// Software framebuffer the host paints the composed animation into.
#[derive(Clone, Debug)]
pub struct CpuTarget {
    frame: Bitmap,
}

impl CpuTarget {
    /// Framebuffer of `width`x`height`, initially transparent.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: Bitmap::new(width, height),
        }
    }

    /// Fill the framebuffer with `color`.
    pub fn clear(&mut self, color: Rgba8Premul) {
        self.frame = Bitmap::solid(self.frame.width(), self.frame.height(), color);
    }

    /// Current framebuffer contents.
    pub fn frame(&self) -> &Bitmap {
        &self.frame
    }
}

impl DrawTarget for CpuTarget {
    fn draw_bitmap(
        &mut self,
        bitmap: &Bitmap,
        dest: PixelRect,
        src: Option<PixelRect>,
    ) -> ComposeResult<()> {
        let src = src
            .unwrap_or(bitmap.bounds())
            .intersect(bitmap.bounds());
        let area = dest.intersect(self.frame.bounds());
        if src.is_empty() || area.is_empty() {
            return Ok(());
        }

        let fw = self.frame.width() as usize;
        let data = self.frame.data_mut();
        for y in area.y..area.bottom() {
            let sy = src.y + scale(y - dest.y, src.height, dest.height);
            for x in area.x..area.right() {
                let sx = src.x + scale(x - dest.x, src.width, dest.width);
                let Some(p) = bitmap.pixel(sx, sy) else {
                    continue;
                };
                let i = ((y as usize) * fw + (x as usize)) * 4;
                let dst = [data[i], data[i + 1], data[i + 2], data[i + 3]];
                let out = blend::over(dst, p.to_array());
                data[i..i + 4].copy_from_slice(&out);
            }
        }
        Ok(())
    }
}

// Nearest-neighbour mapping of a destination offset into `src_len` source pixels.
fn scale(offset: u32, src_len: u32, dst_len: u32) -> u32 {
    ((u64::from(offset) * u64::from(src_len)) / u64::from(dst_len.max(1))) as u32
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
