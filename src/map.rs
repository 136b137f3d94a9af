use crate::error::MapError;

/// Index of a layer; layers draw in ascending order.
pub type LayerIndex = u16;
/// Layer/object grouping tag. `0` means "no visual presence".
pub type Tag = u16;
/// Tile index into the tileset; `0` is transparent.
pub type TileValue = u16;
/// Gameplay zone id stored in a layer's zone plane.
pub type ZoneId = u16;

/// The tag reserved for layers that carry no objects and objects that are
/// never drawn.
pub const NULL_TAG: Tag = 0;

/// Bitfield of per-zone gameplay properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ZoneProps(pub u16);

impl ZoneProps {
    /// No properties set.
    pub const NONE: ZoneProps = ZoneProps(0);
    /// Tiles in the zone block movement.
    pub const BLOCKING: ZoneProps = ZoneProps(1 << 0);
    /// Entering the zone triggers its script.
    pub const TRIGGER: ZoneProps = ZoneProps(1 << 1);

    /// Whether every bit of `other` is set.
    #[inline]
    pub fn contains(self, other: ZoneProps) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of both bitfields.
    #[inline]
    pub fn with(self, other: ZoneProps) -> ZoneProps {
        ZoneProps(self.0 | other.0)
    }
}

/// One layer: a tile value plane, a parallel zone plane and a tag.
#[derive(Debug, Clone)]
pub struct Layer {
    tag: Tag,
    values: Vec<TileValue>,
    zones: Vec<ZoneId>,
}

impl Layer {
    fn new(cells: usize) -> Self {
        Layer {
            tag: NULL_TAG,
            values: vec![0; cells],
            zones: vec![0; cells],
        }
    }

    /// The layer's tag.
    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Row-major tile values.
    #[inline]
    pub fn values(&self) -> &[TileValue] {
        &self.values
    }

    /// Row-major zone ids.
    #[inline]
    pub fn zones(&self) -> &[ZoneId] {
        &self.zones
    }
}

/// Static per-map tile data: dimensions, layers and zone properties.
///
/// Accessors treat out-of-range indices as map-authoring defects and panic.
/// Use the `try_*` variants to check coordinates that may be off the map.
#[derive(Debug, Clone)]
pub struct TileMap {
    width: u16,
    height: u16,
    layers: Vec<Layer>,
    zone_props: Vec<ZoneProps>,
}

impl TileMap {
    /// Allocates an all-transparent, untagged map with layers
    /// `0..=max_layer` and zones `0..=max_zone`.
    pub fn new(
        width: u16,
        height: u16,
        max_layer: LayerIndex,
        max_zone: ZoneId,
    ) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::ZeroSize { width, height });
        }
        let cells = width as usize * height as usize;
        Ok(TileMap {
            width,
            height,
            layers: (0..=max_layer).map(|_| Layer::new(cells)).collect(),
            zone_props: vec![ZoneProps::NONE; max_zone as usize + 1],
        })
    }

    /// Width in tiles.
    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in tiles.
    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Width in pixels for the given tile width.
    #[inline]
    pub fn pixel_width(&self, tile_w: u32) -> i32 {
        self.width as i32 * tile_w as i32
    }

    /// Height in pixels for the given tile height.
    #[inline]
    pub fn pixel_height(&self, tile_h: u32) -> i32 {
        self.height as i32 * tile_h as i32
    }

    /// Highest layer index.
    #[inline]
    pub fn max_layer(&self) -> LayerIndex {
        (self.layers.len() - 1) as LayerIndex
    }

    /// Highest zone index.
    #[inline]
    pub fn max_zone(&self) -> ZoneId {
        (self.zone_props.len() - 1) as ZoneId
    }

    /// Highest tag on any layer; `NULL_TAG` if no layer is tagged.
    pub fn max_tag(&self) -> Tag {
        self.layers.iter().map(Layer::tag).max().unwrap_or(NULL_TAG)
    }

    /// Borrow a layer.
    pub fn layer(&self, layer: LayerIndex) -> &Layer {
        self.check_layer(layer);
        &self.layers[layer as usize]
    }

    /// All layers in draw order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Indices of the layers carrying `tag`, ascending.
    pub fn layers_with_tag(&self, tag: Tag) -> impl Iterator<Item = LayerIndex> + '_ {
        self.layers
            .iter()
            .enumerate()
            .filter(move |(_, l)| l.tag == tag)
            .map(|(i, _)| i as LayerIndex)
    }

    /// Tag of a layer.
    pub fn layer_tag(&self, layer: LayerIndex) -> Tag {
        self.layer(layer).tag
    }

    /// Retags a layer.
    pub fn set_layer_tag(&mut self, layer: LayerIndex, tag: Tag) {
        self.check_layer(layer);
        self.layers[layer as usize].tag = tag;
    }

    /// Tile value at `(x, y)` on `layer`.
    pub fn tile_value(&self, layer: LayerIndex, x: u16, y: u16) -> TileValue {
        let i = self.cell(layer, x, y);
        self.layers[layer as usize].values[i]
    }

    /// Tile value, or `None` when the layer or cell is off the map.
    pub fn try_tile_value(&self, layer: LayerIndex, x: i32, y: i32) -> Option<TileValue> {
        let l = self.layers.get(layer as usize)?;
        self.offset(x, y).map(|i| l.values[i])
    }

    /// Sets the tile value at `(x, y)` on `layer`.
    pub fn set_tile_value(&mut self, layer: LayerIndex, x: u16, y: u16, value: TileValue) {
        let i = self.cell(layer, x, y);
        self.layers[layer as usize].values[i] = value;
    }

    /// Zone id at `(x, y)` on `layer`.
    pub fn tile_zone(&self, layer: LayerIndex, x: u16, y: u16) -> ZoneId {
        let i = self.cell(layer, x, y);
        self.layers[layer as usize].zones[i]
    }

    /// Sets the zone id at `(x, y)` on `layer`.
    pub fn set_tile_zone(
        &mut self,
        layer: LayerIndex,
        x: u16,
        y: u16,
        zone: ZoneId,
    ) -> Result<(), MapError> {
        if zone > self.max_zone() {
            return Err(MapError::ZoneOutOfRange {
                zone,
                max_zone: self.max_zone(),
            });
        }
        let i = self.cell(layer, x, y);
        self.layers[layer as usize].zones[i] = zone;
        Ok(())
    }

    /// Property bitfield of a zone.
    pub fn zone_properties(&self, zone: ZoneId) -> ZoneProps {
        self.check_zone(zone);
        self.zone_props[zone as usize]
    }

    /// Replaces the property bitfield of a zone.
    pub fn set_zone_properties(&mut self, zone: ZoneId, props: ZoneProps) {
        self.check_zone(zone);
        self.zone_props[zone as usize] = props;
    }

    /// Replaces a whole value plane, e.g. from a map loader.
    pub fn fill_layer(&mut self, layer: LayerIndex, values: Vec<TileValue>) -> Result<(), MapError> {
        self.check_layer(layer);
        let expected = self.width as usize * self.height as usize;
        if values.len() != expected {
            return Err(MapError::PlaneSize {
                layer,
                len: values.len(),
                expected,
            });
        }
        self.layers[layer as usize].values = values;
        Ok(())
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32 {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    fn cell(&self, layer: LayerIndex, x: u16, y: u16) -> usize {
        self.check_layer(layer);
        assert!(
            x < self.width && y < self.height,
            "tile ({x}, {y}) outside {}x{} map",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    fn check_layer(&self, layer: LayerIndex) {
        assert!(
            (layer as usize) < self.layers.len(),
            "layer {layer} above max layer {}",
            self.max_layer()
        );
    }

    #[inline]
    fn check_zone(&self, zone: ZoneId) {
        assert!(
            (zone as usize) < self.zone_props.len(),
            "zone {zone} above max zone {}",
            self.max_zone()
        );
    }
}
