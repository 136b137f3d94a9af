//! The viewport: camera state plus the per-frame damage bookkeeping, and the
//! render pass that turns it into backend draw calls.

use crate::backend::{GraphicsBackend, ImageCache, ImageHandle};
use crate::config::ViewConfig;
use crate::error::ViewError;
use crate::geom::PixelRect;
use crate::map::{LayerIndex, TileMap, TileValue, NULL_TAG};
use crate::object::{ObjectId, ObjectRegistry};
use crate::render::{clip, CameraWindow, DirtyList, RenderNode, RenderQueues, Repaint};

/// Counters for one render pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    /// Dirty rectangles consumed, including ones added by damage propagation.
    pub rects: usize,
    /// Rectangles dropped for lying wholly off screen.
    pub culled: usize,
    /// Tile blits issued.
    pub tiles: usize,
    /// Object blits issued.
    pub objects: usize,
    /// Draws skipped because the backend failed.
    pub failed: usize,
}

/// Camera and render bookkeeping bound to exactly one [`TileMap`].
///
/// The viewport owns its map for its whole life; build a new viewport to
/// show a different map. [`into_map`](Self::into_map) tears it down and
/// hands the map back.
#[derive(Debug)]
pub struct Viewport {
    map: TileMap,
    config: ViewConfig,
    x_offset: i32,
    y_offset: i32,
    dirty: DirtyList,
    queues: RenderQueues,
}

impl Viewport {
    /// Binds a viewport to `map` and marks the whole map dirty.
    ///
    /// Fails if the map has no tagged layer or the config has a zero screen
    /// or tile dimension.
    pub fn bind_map(map: TileMap, config: ViewConfig) -> Result<Self, ViewError> {
        if let Err(e) = config.validate() {
            log::error!("refusing to bind viewport: {e}");
            return Err(ViewError::InvalidConfig(e.to_string()));
        }
        let max_tag = map.max_tag();
        if max_tag == NULL_TAG {
            log::error!("refusing to bind viewport: map has no tagged layer");
            return Err(ViewError::NoTags);
        }
        let mut view = Viewport {
            x_offset: 0,
            y_offset: 0,
            dirty: DirtyList::new(),
            queues: RenderQueues::new(max_tag),
            map,
            config,
        };
        let (w, h) = view.map_pixel_size();
        view.dirty.mark(0, 0, w, h)?;
        log::debug!(
            "bound {}x{} map with {} layer(s), max tag {max_tag}",
            view.map.width(),
            view.map.height(),
            view.map.max_layer() as usize + 1
        );
        Ok(view)
    }

    /// The bound map.
    #[inline]
    pub fn map(&self) -> &TileMap {
        &self.map
    }

    /// Screen and tile settings.
    #[inline]
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Camera offset in map-space pixels.
    #[inline]
    pub fn offset(&self) -> (i32, i32) {
        (self.x_offset, self.y_offset)
    }

    /// Current camera window.
    pub fn camera(&self) -> CameraWindow {
        CameraWindow {
            x_offset: self.x_offset,
            y_offset: self.y_offset,
            screen_w: self.config.screen_width as i32,
            screen_h: self.config.screen_height as i32,
        }
    }

    /// Rectangles waiting for the next render pass.
    #[inline]
    pub fn pending(&self) -> &DirtyList {
        &self.dirty
    }

    /// Per-tag object queues.
    #[inline]
    pub fn queues(&self) -> &RenderQueues {
        &self.queues
    }

    /// Whether the next [`render`](Self::render) would do nothing.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.dirty.is_empty() && self.queues.is_empty()
    }

    /// Map size in pixels.
    pub fn map_pixel_size(&self) -> (i32, i32) {
        (
            self.map.pixel_width(self.config.tile_width),
            self.map.pixel_height(self.config.tile_height),
        )
    }

    /// Tears the viewport down, returning its map.
    pub fn into_map(self) -> TileMap {
        if !self.queues.is_empty() {
            log::error!(
                "viewport dropped with {} object(s) still queued",
                self.queues.len()
            );
        }
        self.map
    }

    /// Records a stale map-space region. Non-positive sizes are rejected
    /// and change nothing.
    pub fn mark_dirty(&mut self, x: i32, y: i32, w: i32, h: i32) -> Result<(), ViewError> {
        self.dirty.mark(x, y, w, h)
    }

    /// Changes one tile and marks it dirty.
    pub fn set_tile(&mut self, layer: LayerIndex, x: u16, y: u16, value: TileValue) {
        self.map.set_tile_value(layer, x, y, value);
        let tw = self.config.tile_width as i32;
        let th = self.config.tile_height as i32;
        // tile sizes are validated non-zero at bind time
        let _ = self.dirty.mark(x as i32 * tw, y as i32 * th, tw, th);
    }

    /// Moves the camera to an absolute offset and marks the whole new window
    /// dirty. Offsets whose window would run past `i32::MAX` are rejected.
    pub fn jump_to(&mut self, x_offset: i32, y_offset: i32) -> Result<(), ViewError> {
        if !self.window_fits(x_offset, y_offset) {
            log::error!("camera offset ({x_offset}, {y_offset}) out of range");
            return Err(ViewError::OffsetOverflow {
                x_offset: self.x_offset,
                y_offset: self.y_offset,
                dx: x_offset.wrapping_sub(self.x_offset),
                dy: y_offset.wrapping_sub(self.y_offset),
            });
        }
        self.x_offset = x_offset;
        self.y_offset = y_offset;
        self.dirty.mark_rect(self.camera().rect())?;
        log::trace!("camera jumped to ({x_offset}, {y_offset})");
        Ok(())
    }

    /// Camera offsets after moving by `(dx, dy)`, or `OffsetOverflow` when
    /// the move or the resulting window does not fit in an `i32`.
    pub fn scroll_target(&self, dx: i32, dy: i32) -> Result<(i32, i32), ViewError> {
        let overflow = ViewError::OffsetOverflow {
            x_offset: self.x_offset,
            y_offset: self.y_offset,
            dx,
            dy,
        };
        // |i32::MIN| has no i32 negation for the backend shift
        if dx == i32::MIN || dy == i32::MIN {
            return Err(overflow);
        }
        match (self.x_offset.checked_add(dx), self.y_offset.checked_add(dy)) {
            (Some(x), Some(y)) if self.window_fits(x, y) => Ok((x, y)),
            _ => Err(overflow),
        }
    }

    fn window_fits(&self, x_offset: i32, y_offset: i32) -> bool {
        x_offset.checked_add(self.config.screen_width as i32).is_some()
            && y_offset.checked_add(self.config.screen_height as i32).is_some()
    }

    /// Queues an object for the next render pass, sorted by baseline within
    /// its tag, and flags it dirty.
    ///
    /// Rejects unknown objects, objects with nothing to draw, tag 0, tags
    /// above the map's highest tag, and objects already queued.
    pub fn enqueue<R: ObjectRegistry + ?Sized>(
        &mut self,
        objects: &mut R,
        id: ObjectId,
    ) -> Result<(), ViewError> {
        self.queue_object(objects, id).map_err(|e| {
            log::error!("cannot queue object: {e}");
            e
        })
    }

    /// Queues an object and marks its bounding box dirty. Does nothing if it
    /// is already dirty, has the null tag or has no image.
    pub fn mark_object_dirty<R: ObjectRegistry + ?Sized>(
        &mut self,
        objects: &mut R,
        id: ObjectId,
    ) -> Result<(), ViewError> {
        let Some(tag) = objects.tag(id) else {
            log::error!("cannot dirty unknown object {id:?}");
            return Err(ViewError::UnknownObject(id));
        };
        if objects.is_dirty(id) || tag == NULL_TAG {
            return Ok(());
        }
        let Some(bounds) = objects.image(id).filter(|i| i.is_drawable()).map(|i| i.bounds()) else {
            return Ok(());
        };
        self.enqueue(objects, id)?;
        self.dirty.mark_rect(bounds)
    }

    fn queue_object<R: ObjectRegistry + ?Sized>(
        &mut self,
        objects: &mut R,
        id: ObjectId,
    ) -> Result<(), ViewError> {
        let tag = objects.tag(id).ok_or(ViewError::UnknownObject(id))?;
        let baseline = match objects.image(id) {
            Some(img) if img.is_drawable() => img.baseline(),
            Some(_) => return Err(ViewError::NoImage(id)),
            None => return Err(ViewError::UnknownObject(id)),
        };
        if objects.is_dirty(id) {
            return Err(ViewError::AlreadyQueued(id));
        }
        self.queues.insert(tag, RenderNode { object: id, baseline })?;
        objects.set_dirty(id, true);
        Ok(())
    }

    /// Moves the camera by `(dx, dy)`, shifts the backend's screen contents
    /// and marks only the newly exposed edge strips dirty.
    ///
    /// Each non-zero axis yields one strip `|d|` pixels deep spanning the
    /// full orthogonal screen dimension; a strip never exceeds the screen.
    ///
    /// A move that would overflow the camera offsets is rejected before
    /// anything changes, backend included.
    pub fn scroll<B: GraphicsBackend + ?Sized>(
        &mut self,
        gfx: &mut B,
        dx: i32,
        dy: i32,
    ) -> Result<(), ViewError> {
        if dx == 0 && dy == 0 {
            return Ok(());
        }
        let (x_offset, y_offset) = self.scroll_target(dx, dy).map_err(|e| {
            log::error!("cannot scroll: {e}");
            e
        })?;
        self.x_offset = x_offset;
        self.y_offset = y_offset;
        gfx.scroll_screen(-dx, -dy);

        let sw = self.config.screen_width as i32;
        let sh = self.config.screen_height as i32;
        // strip sizes below are positive whenever the axis moved
        if dx != 0 {
            let w = dx.abs().min(sw);
            let x = if dx > 0 { self.x_offset + sw - w } else { self.x_offset };
            let _ = self.dirty.mark(x, self.y_offset, w, sh);
        }
        if dy != 0 {
            let h = dy.abs().min(sh);
            let y = if dy > 0 { self.y_offset + sh - h } else { self.y_offset };
            let _ = self.dirty.mark(self.x_offset, y, sw, h);
        }
        log::trace!(
            "scrolled by ({dx}, {dy}) to ({}, {})",
            self.x_offset,
            self.y_offset
        );
        Ok(())
    }

    /// Runs one render pass. A no-op when no rectangle is pending and no
    /// object is queued; queued objects are drawn even with nothing pending.
    ///
    /// Visible dirty rectangles are forwarded as update regions, objects
    /// they touch are queued (and their own boxes dirtied), then every
    /// layer is drawn bottom to top: its tiles inside the damaged regions,
    /// followed by the objects queued under its tag. Backend failures skip
    /// the single draw and are counted in [`RenderStats::failed`].
    ///
    /// Objects still queued after the last layer (their tag is carried by
    /// no layer) are dropped and reported as [`ViewError::QueueResidue`].
    pub fn render<B, R>(
        &mut self,
        gfx: &mut B,
        images: &mut ImageCache,
        objects: &mut R,
    ) -> Result<RenderStats, ViewError>
    where
        B: GraphicsBackend + ?Sized,
        R: ObjectRegistry + ?Sized,
    {
        let mut stats = RenderStats::default();
        if self.dirty.is_empty() && self.queues.is_empty() {
            return Ok(stats);
        }

        let repaints = self.collect_repaints(gfx, objects, &mut stats);
        if !repaints.is_empty() {
            if let Some([r, g, b]) = self.config.clear_color {
                let camera = self.camera();
                for rp in &repaints {
                    let s = camera.to_screen(&rp.covered);
                    if let Err(e) = gfx.fill_rect(s.x, s.y, s.w as u32, s.h as u32, r, g, b) {
                        log::warn!("clear of {s:?} failed: {e}");
                        stats.failed += 1;
                    }
                }
            }
        }

        let tileset = if repaints.iter().any(|rp| !rp.tiles.is_empty()) {
            images.get_or_load(gfx, &self.config.tileset)
        } else {
            None
        };

        for layer in 0..=self.map.max_layer() {
            self.draw_tiles(gfx, tileset, layer, &repaints, &mut stats);
            let tag = self.map.layer_tag(layer);
            if tag != NULL_TAG {
                let nodes = self.queues.take(tag);
                draw_objects(&nodes, &self.camera(), gfx, images, objects, &mut stats);
            }
        }

        self.dirty.clear();
        log::debug!("render pass: {stats:?}");
        self.check_residue(objects)?;
        Ok(stats)
    }

    /// Consumes the pending list newest first. Invisible rectangles are
    /// dropped; visible ones are hinted to the backend and widen the damage
    /// to every object they touch.
    fn collect_repaints<B, R>(
        &mut self,
        gfx: &mut B,
        objects: &mut R,
        stats: &mut RenderStats,
    ) -> Vec<Repaint>
    where
        B: GraphicsBackend + ?Sized,
        R: ObjectRegistry + ?Sized,
    {
        let camera = self.camera();
        let (tw, th) = (self.config.tile_width, self.config.tile_height);
        let mut repaints = Vec::new();
        while let Some(rect) = self.dirty.pop_newest() {
            stats.rects += 1;
            let Some(rp) = clip(&rect, &camera, tw, th, self.map.width(), self.map.height()) else {
                stats.culled += 1;
                log::trace!("culled {rect:?}");
                continue;
            };
            let s = rp.screen;
            gfx.add_update_region(s.x, s.y, s.w as u32, s.h as u32);
            self.propagate(&rp.covered, objects);
            repaints.push(rp);
        }
        repaints
    }

    /// Queues every clean object overlapping `region` and marks its box.
    /// An object turns dirty at most once per pass, which bounds the
    /// widening.
    fn propagate<R: ObjectRegistry + ?Sized>(&mut self, region: &PixelRect, objects: &mut R) {
        for id in objects.object_ids() {
            if objects.is_dirty(id) || objects.tag(id).unwrap_or(NULL_TAG) == NULL_TAG {
                continue;
            }
            let Some(bounds) = objects
                .image(id)
                .filter(|i| i.is_drawable())
                .map(|i| i.bounds())
            else {
                continue;
            };
            if !bounds.intersects(region) {
                continue;
            }
            match self.queue_object(objects, id) {
                Ok(()) => {
                    let _ = self.dirty.mark_rect(bounds);
                }
                Err(e) => log::warn!("skipping damaged object: {e}"),
            }
        }
    }

    /// Blits one layer's non-empty tiles under every repaint. Without a
    /// tileset each of them counts as a failed draw.
    fn draw_tiles<B: GraphicsBackend + ?Sized>(
        &self,
        gfx: &mut B,
        tileset: Option<ImageHandle>,
        layer: LayerIndex,
        repaints: &[Repaint],
        stats: &mut RenderStats,
    ) {
        let tw = self.config.tile_width;
        let th = self.config.tile_height;
        let values = self.map.layer(layer).values();
        let row = self.map.width() as usize;
        for rp in repaints {
            for (tx, ty) in rp.tiles.iter() {
                let value = values[ty as usize * row + tx as usize];
                if value == 0 {
                    continue;
                }
                let Some(tileset) = tileset else {
                    stats.failed += 1;
                    continue;
                };
                let dst_x = tx * tw as i32 - self.x_offset;
                let dst_y = ty * th as i32 - self.y_offset;
                match gfx.blit(tileset, value as i32 * tw as i32, 0, dst_x, dst_y, tw, th) {
                    Ok(()) => stats.tiles += 1,
                    Err(e) => {
                        log::warn!("tile {value} at ({tx}, {ty}) on layer {layer} not drawn: {e}");
                        stats.failed += 1;
                    }
                }
            }
        }
    }

    fn check_residue<R: ObjectRegistry + ?Sized>(&mut self, objects: &mut R) -> Result<(), ViewError> {
        let residue = self.queues.take_residue();
        let Some((tag, nodes)) = residue.first() else {
            return Ok(());
        };
        for (t, ns) in &residue {
            log::error!("{} object(s) queued under tag {t}, which no layer carries", ns.len());
            for n in ns {
                objects.set_dirty(n.object, false);
            }
        }
        Err(ViewError::QueueResidue {
            tag: *tag,
            count: nodes.len(),
        })
    }
}

/// Drains one tag's queue back to front. Every node's object is marked clean
/// whether or not its blit succeeds.
fn draw_objects<B, R>(
    nodes: &[RenderNode],
    camera: &CameraWindow,
    gfx: &mut B,
    images: &mut ImageCache,
    objects: &mut R,
    stats: &mut RenderStats,
) where
    B: GraphicsBackend + ?Sized,
    R: ObjectRegistry + ?Sized,
{
    for node in nodes {
        let id = node.object;
        let draw = objects.image(id).and_then(|img| {
            let name = img.image.clone()?;
            img.is_drawable()
                .then(|| (name, img.image_x, img.image_y, img.bounds()))
        });
        objects.set_dirty(id, false);
        let Some((name, src_x, src_y, bounds)) = draw else {
            log::warn!("queued object {id:?} vanished or lost its image");
            continue;
        };
        if !camera.sees(&bounds) {
            continue;
        }
        let Some(handle) = images.get_or_load(gfx, &name) else {
            stats.failed += 1;
            continue;
        };
        let dst = camera.to_screen(&bounds);
        match gfx.blit(handle, src_x, src_y, dst.x, dst.y, bounds.w as u32, bounds.h as u32) {
            Ok(()) => stats.objects += 1,
            Err(e) => {
                log::warn!("object {id:?} not drawn: {e}");
                stats.failed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendCall, RecordingBackend};
    use crate::map::Tag;
    use crate::object::ObjectTable;

    fn config() -> ViewConfig {
        ViewConfig {
            screen_width: 128,
            screen_height: 96,
            tile_width: 32,
            tile_height: 32,
            ..ViewConfig::default()
        }
    }

    fn map(w: u16, h: u16) -> TileMap {
        let mut map = TileMap::new(w, h, 1, 0).expect("map");
        map.set_layer_tag(1, 1);
        map.fill_layer(0, vec![1; w as usize * h as usize]).expect("plane");
        map
    }

    fn sprite(table: &mut ObjectTable, name: &str, tag: Tag, x: i32, y: i32, w: u16, h: u16) -> ObjectId {
        let id = table.add(name).expect("add");
        let o = table.get_mut(id).expect("live");
        o.set_image("sprites.png", 0, 0, w, h);
        o.set_position(x, y, crate::object::Reference::TopLeft);
        o.set_tag(tag);
        id
    }

    #[test]
    fn tagless_map_cannot_be_bound() {
        let map = TileMap::new(4, 4, 2, 0).expect("map");
        assert!(matches!(Viewport::bind_map(map, config()), Err(ViewError::NoTags)));
    }

    #[test]
    fn bad_config_cannot_be_bound() {
        let cfg = ViewConfig {
            tile_width: 0,
            ..config()
        };
        assert!(matches!(
            Viewport::bind_map(map(4, 4), cfg),
            Err(ViewError::InvalidConfig(_))
        ));
    }

    #[test]
    fn binding_marks_whole_map() {
        let view = Viewport::bind_map(map(10, 8), config()).expect("bind");
        let pending: Vec<_> = view.pending().iter().copied().collect();
        assert_eq!(pending, vec![PixelRect::new(0, 0, 320, 256)]);
        assert_eq!(view.queues().max_tag(), 1);
    }

    #[test]
    fn second_render_is_silent() {
        let mut view = Viewport::bind_map(map(4, 4), config()).expect("bind");
        let mut gfx = RecordingBackend::new();
        let mut images = ImageCache::new();
        let mut objects = ObjectTable::new();
        let first = view.render(&mut gfx, &mut images, &mut objects).expect("render");
        assert!(first.tiles > 0);
        gfx.take_calls();
        let second = view.render(&mut gfx, &mut images, &mut objects).expect("render");
        assert_eq!(second, RenderStats::default());
        assert!(gfx.calls().is_empty());
        assert!(view.is_idle());
    }

    #[test]
    fn only_visible_tiles_are_drawn_after_bind() {
        let mut view = Viewport::bind_map(map(20, 20), config()).expect("bind");
        let mut gfx = RecordingBackend::new();
        let stats = view
            .render(&mut gfx, &mut ImageCache::new(), &mut ObjectTable::new())
            .expect("render");
        // 128x96 screen over 32px tiles
        assert_eq!(stats.tiles, 4 * 3);
        assert_eq!(
            gfx.count(|c| matches!(c, BackendCall::UpdateRegion { .. })),
            1
        );
    }

    #[test]
    fn scroll_marks_one_strip_per_axis() {
        let mut view = Viewport::bind_map(map(20, 20), config()).expect("bind");
        let mut gfx = RecordingBackend::new();
        view.render(&mut gfx, &mut ImageCache::new(), &mut ObjectTable::new())
            .expect("render");

        view.scroll(&mut gfx, 5, 0).expect("scroll");
        let pending: Vec<_> = view.pending().iter().copied().collect();
        assert_eq!(pending, vec![PixelRect::new(128, 0, 5, 96)]);
        assert_eq!(view.offset(), (5, 0));

        view.scroll(&mut gfx, 0, 0).expect("scroll");
        assert_eq!(view.pending().len(), 1);

        view.scroll(&mut gfx, -3, 7).expect("scroll");
        let pending: Vec<_> = view.pending().iter().copied().collect();
        assert_eq!(
            pending,
            vec![
                PixelRect::new(2, 96, 128, 7),
                PixelRect::new(2, 7, 3, 96),
                PixelRect::new(128, 0, 5, 96),
            ]
        );
        assert_eq!(
            gfx.count(|c| matches!(c, BackendCall::ScrollScreen { .. })),
            2
        );
    }

    #[test]
    fn scroll_strip_is_clamped_to_screen() {
        let mut view = Viewport::bind_map(map(40, 40), config()).expect("bind");
        view.render(
            &mut RecordingBackend::new(),
            &mut ImageCache::new(),
            &mut ObjectTable::new(),
        )
        .expect("render");
        view.scroll(&mut RecordingBackend::new(), 500, 0).expect("scroll");
        let pending: Vec<_> = view.pending().iter().copied().collect();
        assert_eq!(pending, vec![PixelRect::new(500, 0, 128, 96)]);
    }

    #[test]
    fn damage_propagates_to_overlapping_object_once() {
        let mut view = Viewport::bind_map(map(4, 4), config()).expect("bind");
        let mut gfx = RecordingBackend::new();
        let mut images = ImageCache::new();
        let mut objects = ObjectTable::new();
        view.render(&mut gfx, &mut images, &mut objects).expect("render");

        let id = sprite(&mut objects, "crate", 1, 40, 40, 16, 16);
        view.mark_dirty(35, 35, 10, 10).expect("mark");
        view.mark_dirty(45, 45, 4, 4).expect("mark");
        gfx.take_calls();
        let stats = view.render(&mut gfx, &mut images, &mut objects).expect("render");
        // two marked rects plus the object's own box
        assert_eq!(stats.rects, 3);
        assert_eq!(stats.objects, 1);
        assert_eq!(gfx.blits_of("sprites.png").count(), 1);
        assert!(!objects.is_dirty(id));
    }

    #[test]
    fn enqueue_rejects_bad_requests() {
        let mut view = Viewport::bind_map(map(4, 4), config()).expect("bind");
        let mut objects = ObjectTable::new();
        let untagged = sprite(&mut objects, "a", 0, 0, 0, 8, 8);
        let high = sprite(&mut objects, "b", 2, 0, 0, 8, 8);
        let bare = objects.add("c").expect("add");
        objects.get_mut(bare).expect("live").set_tag(1);
        let ok = sprite(&mut objects, "d", 1, 0, 0, 8, 8);

        assert!(matches!(view.enqueue(&mut objects, untagged), Err(ViewError::NullTag(_))));
        assert!(matches!(
            view.enqueue(&mut objects, high),
            Err(ViewError::TagOutOfRange { tag: 2, max_tag: 1 })
        ));
        assert!(matches!(view.enqueue(&mut objects, bare), Err(ViewError::NoImage(_))));
        view.enqueue(&mut objects, ok).expect("queue");
        assert!(matches!(view.enqueue(&mut objects, ok), Err(ViewError::AlreadyQueued(_))));
        assert_eq!(view.queues().len(), 1);
        assert!(!objects.is_dirty(untagged));
    }

    #[test]
    fn mark_object_dirty_is_idempotent() {
        let mut view = Viewport::bind_map(map(4, 4), config()).expect("bind");
        let mut objects = ObjectTable::new();
        view.render(&mut RecordingBackend::new(), &mut ImageCache::new(), &mut objects)
            .expect("render");
        let id = sprite(&mut objects, "hero", 1, 8, 8, 16, 16);
        view.mark_object_dirty(&mut objects, id).expect("dirty");
        view.mark_object_dirty(&mut objects, id).expect("dirty again");
        assert_eq!(view.queues().len(), 1);
        assert_eq!(view.pending().len(), 1);
    }

    #[test]
    fn set_tile_dirties_that_tile() {
        let mut view = Viewport::bind_map(map(4, 4), config()).expect("bind");
        let mut gfx = RecordingBackend::new();
        view.render(&mut gfx, &mut ImageCache::new(), &mut ObjectTable::new())
            .expect("render");
        view.set_tile(0, 2, 1, 5);
        let pending: Vec<_> = view.pending().iter().copied().collect();
        assert_eq!(pending, vec![PixelRect::new(64, 32, 32, 32)]);
        assert_eq!(view.map().tile_value(0, 2, 1), 5);
    }

    #[test]
    fn queued_object_drains_with_nothing_pending() {
        let mut view = Viewport::bind_map(map(4, 4), config()).expect("bind");
        let mut gfx = RecordingBackend::new();
        let mut images = ImageCache::new();
        let mut objects = ObjectTable::new();
        view.render(&mut gfx, &mut images, &mut objects).expect("render");

        let id = sprite(&mut objects, "hero", 1, 8, 8, 16, 16);
        view.enqueue(&mut objects, id).expect("queue");
        assert!(view.pending().is_empty());
        assert!(!view.is_idle());
        gfx.take_calls();
        let stats = view.render(&mut gfx, &mut images, &mut objects).expect("render");
        assert_eq!(stats.objects, 1);
        assert_eq!(stats.tiles, 0);
        assert!(view.queues().is_empty());
        assert!(!objects.is_dirty(id));
        assert!(view.is_idle());
    }

    #[test]
    fn overflowing_rect_is_refused_before_render() {
        let mut view = Viewport::bind_map(map(4, 4), config()).expect("bind");
        let mut gfx = RecordingBackend::new();
        let mut images = ImageCache::new();
        let mut objects = ObjectTable::new();
        view.render(&mut gfx, &mut images, &mut objects).expect("render");

        assert!(matches!(
            view.mark_dirty(10, 0, i32::MAX, 10),
            Err(ViewError::RectOverflow { .. })
        ));
        assert!(view.is_idle());
        let stats = view.render(&mut gfx, &mut images, &mut objects).expect("render");
        assert_eq!(stats, RenderStats::default());
    }

    #[test]
    fn object_at_pixel_space_edge_does_not_break_propagation() {
        let mut view = Viewport::bind_map(map(4, 4), config()).expect("bind");
        let mut objects = ObjectTable::new();
        sprite(&mut objects, "far", 1, i32::MAX - 2, 0, 16, 16);
        let stats = view
            .render(&mut RecordingBackend::new(), &mut ImageCache::new(), &mut objects)
            .expect("render");
        assert_eq!(stats.objects, 0);
    }

    #[test]
    fn scroll_overflow_changes_nothing() {
        let mut view = Viewport::bind_map(map(4, 4), config()).expect("bind");
        let mut gfx = RecordingBackend::new();
        view.render(&mut gfx, &mut ImageCache::new(), &mut ObjectTable::new())
            .expect("render");
        gfx.take_calls();

        assert!(matches!(
            view.scroll(&mut gfx, i32::MIN, 0),
            Err(ViewError::OffsetOverflow { dx: i32::MIN, .. })
        ));
        assert!(matches!(
            view.scroll(&mut gfx, 0, i32::MAX),
            Err(ViewError::OffsetOverflow { .. })
        ));
        assert_eq!(view.offset(), (0, 0));
        assert!(view.is_idle());
        assert!(gfx.calls().is_empty());

        // the window's right edge must stay representable
        view.jump_to(i32::MAX - 128, 0).expect("jump");
        assert!(view.scroll(&mut gfx, 1, 0).is_err());
        assert_eq!(view.offset(), (i32::MAX - 128, 0));
        assert!(matches!(
            view.jump_to(i32::MAX, 0),
            Err(ViewError::OffsetOverflow { .. })
        ));
    }

    #[test]
    fn jump_marks_new_window() {
        let mut view = Viewport::bind_map(map(20, 20), config()).expect("bind");
        view.jump_to(64, 32).expect("jump");
        assert_eq!(view.offset(), (64, 32));
        assert_eq!(view.pending().iter().next(), Some(&PixelRect::new(64, 32, 128, 96)));
    }
}
