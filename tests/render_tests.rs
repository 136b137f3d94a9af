// tests/render_tests.rs

use mapview::{
    BackendCall, ImageCache, ObjectId, ObjectTable, PixelRect, RecordingBackend, Reference,
    RenderStats, Tag, TileMap, ViewConfig, ViewError, Viewport,
};

const TILE: u32 = 32;

/// Every layer filled with `layer + 1` so tile blits name their layer
/// through `src_x`.
fn layered_map(width: u16, height: u16, tags: &[Tag]) -> TileMap {
    let mut map = TileMap::new(width, height, tags.len() as u16 - 1, 0).expect("map");
    let cells = width as usize * height as usize;
    for (layer, &tag) in tags.iter().enumerate() {
        let layer = layer as u16;
        map.set_layer_tag(layer, tag);
        map.fill_layer(layer, vec![layer + 1; cells]).expect("plane");
    }
    map
}

fn layer_of(call: &BackendCall) -> Option<u16> {
    match call {
        BackendCall::Blit { image, src_x, .. } if image == "tiles.png" => {
            Some((*src_x as u32 / TILE) as u16 - 1)
        }
        _ => None,
    }
}

fn sprite(objects: &mut ObjectTable, name: &str, tag: Tag, x: i32, y: i32, w: u16, h: u16) -> ObjectId {
    let id = objects.add(name).expect("add");
    let o = objects.get_mut(id).expect("live");
    o.set_image(&format!("{name}.png"), 0, 0, w, h);
    o.set_position(x, y, Reference::TopLeft);
    o.set_tag(tag);
    id
}

struct Scene {
    view: Viewport,
    gfx: RecordingBackend,
    images: ImageCache,
    objects: ObjectTable,
}

impl Scene {
    fn new(map: TileMap, config: ViewConfig) -> Self {
        Scene {
            view: Viewport::bind_map(map, config).expect("bind"),
            gfx: RecordingBackend::new(),
            images: ImageCache::new(),
            objects: ObjectTable::new(),
        }
    }

    fn render(&mut self) -> Result<RenderStats, ViewError> {
        self.gfx.take_calls();
        self.view
            .render(&mut self.gfx, &mut self.images, &mut self.objects)
    }
}

#[test]
fn object_is_composited_between_its_layer_and_the_next() {
    let mut scene = Scene::new(layered_map(10, 10, &[0, 1, 0, 2]), ViewConfig::default());

    let first = scene.render().expect("first render");
    assert_eq!(first.tiles, 4 * 100);
    assert_eq!(first.objects, 0);
    for layer in 0..4 {
        assert!(scene.gfx.calls().iter().any(|c| layer_of(c) == Some(layer)));
    }

    let hero = sprite(&mut scene.objects, "hero", 1, 40, 50, 16, 20);
    scene
        .view
        .mark_object_dirty(&mut scene.objects, hero)
        .expect("dirty");
    let second = scene.render().expect("second render");
    assert_eq!(second.objects, 1);
    // box spans tiles x 1..2, y 1..3 on each of four layers
    assert_eq!(second.tiles, 4 * 2);

    let calls = scene.gfx.calls();
    let hero_at = calls
        .iter()
        .position(|c| matches!(c, BackendCall::Blit { image, .. } if image == "hero.png"))
        .expect("hero blitted");
    let last_layer1 = calls.iter().rposition(|c| layer_of(c) == Some(1)).expect("layer 1");
    let first_layer2 = calls.iter().position(|c| layer_of(c) == Some(2)).expect("layer 2");
    assert!(last_layer1 < hero_at && hero_at < first_layer2);
    assert_eq!(
        calls[hero_at],
        BackendCall::Blit {
            image: "hero.png".into(),
            src_x: 0,
            src_y: 0,
            dst_x: 40,
            dst_y: 50,
            w: 16,
            h: 20,
        }
    );
}

#[test]
fn lower_baseline_draws_first_within_a_tag() {
    let mut scene = Scene::new(layered_map(10, 10, &[1]), ViewConfig::default());
    scene.render().expect("first render");

    let tall = sprite(&mut scene.objects, "tall", 1, 100, 90, 16, 40);
    let short = sprite(&mut scene.objects, "short", 1, 104, 100, 16, 20);
    scene.view.enqueue(&mut scene.objects, tall).expect("queue");
    scene.view.enqueue(&mut scene.objects, short).expect("queue");
    scene.view.mark_dirty(100, 90, 20, 40).expect("mark");
    scene.render().expect("render");

    let order: Vec<_> = scene
        .gfx
        .calls()
        .iter()
        .filter_map(|c| match c {
            BackendCall::Blit { image, .. } if image != "tiles.png" => Some(image.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(order, ["short.png", "tall.png"]);
}

#[test]
fn offscreen_rect_never_reaches_the_backend() {
    let config = ViewConfig {
        screen_width: 320,
        screen_height: 240,
        ..ViewConfig::default()
    };
    let mut scene = Scene::new(layered_map(40, 40, &[1]), config);
    scene.render().expect("first render");

    scene.view.mark_dirty(800, 0, 32, 32).expect("mark");
    let stats = scene.render().expect("render");
    assert_eq!(stats.culled, 1);
    assert!(scene.gfx.calls().is_empty());
}

#[test]
fn partly_visible_rect_is_clipped_to_screen() {
    let config = ViewConfig {
        screen_width: 320,
        screen_height: 240,
        ..ViewConfig::default()
    };
    let mut scene = Scene::new(layered_map(40, 40, &[1]), config);
    scene.render().expect("first render");

    scene.view.mark_dirty(300, 230, 100, 100).expect("mark");
    let stats = scene.render().expect("render");
    assert_eq!(
        scene.gfx.calls()[0],
        BackendCall::UpdateRegion {
            x: 300,
            y: 230,
            w: 20,
            h: 10,
        }
    );
    // tile column 9, row 7
    assert_eq!(stats.tiles, 1);
}

#[test]
fn damaged_tiles_are_redrawn_whole() {
    let mut scene = Scene::new(layered_map(10, 10, &[1]), ViewConfig::default());
    scene.render().expect("first render");

    scene.view.mark_dirty(20, 20, 30, 30).expect("mark");
    scene.render().expect("render");
    let mut dsts: Vec<_> = scene
        .gfx
        .blits_of("tiles.png")
        .map(|c| match c {
            BackendCall::Blit { dst_x, dst_y, w, h, .. } => (*dst_x, *dst_y, *w, *h),
            _ => unreachable!(),
        })
        .collect();
    dsts.sort();
    assert_eq!(
        dsts,
        vec![(0, 0, 32, 32), (0, 32, 32, 32), (32, 0, 32, 32), (32, 32, 32, 32)]
    );
}

#[test]
fn render_with_nothing_pending_is_a_no_op() {
    let mut scene = Scene::new(layered_map(4, 4, &[1]), ViewConfig::default());
    scene.render().expect("first render");
    let stats = scene.render().expect("second render");
    assert_eq!(stats, RenderStats::default());
    assert!(scene.gfx.calls().is_empty());
}

#[test]
fn scroll_repaints_only_the_exposed_strip() {
    let mut scene = Scene::new(layered_map(40, 40, &[1]), ViewConfig::default());
    scene.render().expect("first render");

    scene.view.scroll(&mut scene.gfx, 5, 0).expect("scroll");
    assert_eq!(
        scene.gfx.calls().last(),
        Some(&BackendCall::ScrollScreen { dx: -5, dy: 0 })
    );
    let stats = scene.render().expect("render");
    assert_eq!(
        scene.gfx.calls()[0],
        BackendCall::UpdateRegion {
            x: 635,
            y: 0,
            w: 5,
            h: 480,
        }
    );
    // one tile column, fifteen rows
    assert_eq!(stats.tiles, 15);
    assert!(scene
        .gfx
        .blits_of("tiles.png")
        .all(|c| matches!(c, BackendCall::Blit { dst_x: 635, .. })));
}

#[test]
fn object_under_a_repainted_tile_is_redrawn() {
    let mut scene = Scene::new(layered_map(10, 10, &[1]), ViewConfig::default());
    scene.render().expect("first render");

    // the rect misses the sprite but the tile it dirties does not
    let id = sprite(&mut scene.objects, "barrel", 1, 28, 28, 8, 8);
    scene.view.mark_dirty(2, 2, 4, 4).expect("mark");
    let stats = scene.render().expect("render");
    assert_eq!(stats.objects, 1);
    assert_eq!(stats.rects, 2);
    assert!(!scene.objects.get(id).expect("live").is_dirty());
}

#[test]
fn object_under_untouched_tiles_is_left_alone() {
    let mut scene = Scene::new(layered_map(10, 10, &[1]), ViewConfig::default());
    scene.render().expect("first render");

    sprite(&mut scene.objects, "barrel", 1, 200, 200, 8, 8);
    scene.view.mark_dirty(2, 2, 4, 4).expect("mark");
    let stats = scene.render().expect("render");
    assert_eq!(stats.objects, 0);
    assert_eq!(stats.rects, 1);
}

#[test]
fn layers_sharing_a_tag_draw_the_object_once() {
    let mut scene = Scene::new(layered_map(10, 10, &[1, 0, 1]), ViewConfig::default());
    scene.render().expect("first render");

    let id = sprite(&mut scene.objects, "hero", 1, 64, 64, 16, 16);
    scene
        .view
        .mark_object_dirty(&mut scene.objects, id)
        .expect("dirty");
    let stats = scene.render().expect("render");
    assert_eq!(stats.objects, 1);
    let calls = scene.gfx.calls();
    let hero_at = calls
        .iter()
        .position(|c| matches!(c, BackendCall::Blit { image, .. } if image == "hero.png"))
        .expect("hero blitted");
    let first_layer1 = calls.iter().position(|c| layer_of(c) == Some(1)).expect("layer 1");
    assert!(hero_at < first_layer1);
}

#[test]
fn missing_sprite_image_does_not_blank_the_frame() {
    let mut scene = Scene::new(layered_map(10, 10, &[1]), ViewConfig::default());
    scene.gfx.fail_image("ghost.png");
    let ghost = sprite(&mut scene.objects, "ghost", 1, 0, 0, 16, 16);
    let hero = sprite(&mut scene.objects, "hero", 1, 64, 0, 16, 16);

    let stats = scene.render().expect("render");
    // whole map, then the one tile under each sprite's box
    assert_eq!(stats.tiles, 102);
    assert_eq!(stats.objects, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(scene.gfx.blits_of("hero.png").count(), 1);

    scene
        .view
        .mark_object_dirty(&mut scene.objects, ghost)
        .expect("dirty");
    scene
        .view
        .mark_object_dirty(&mut scene.objects, hero)
        .expect("dirty");
    scene.render().expect("render");
    assert_eq!(
        scene
            .gfx
            .count(|c| matches!(c, BackendCall::LoadImage { .. })),
        0
    );
}

#[test]
fn object_with_unused_tag_is_reported_as_residue() {
    let mut scene = Scene::new(layered_map(4, 4, &[2, 0]), ViewConfig::default());
    scene.render().expect("first render");

    let id = sprite(&mut scene.objects, "lost", 1, 0, 0, 8, 8);
    scene.view.enqueue(&mut scene.objects, id).expect("queue");
    scene.view.mark_dirty(0, 0, 8, 8).expect("mark");
    let err = scene.render().unwrap_err();
    assert!(matches!(err, ViewError::QueueResidue { tag: 1, count: 1 }));
    assert!(scene.gfx.blits_of("lost.png").next().is_none());
    assert!(!scene.objects.get(id).expect("live").is_dirty());
    assert!(scene.view.queues().is_empty());
    assert!(scene.view.is_idle());
}

#[test]
fn clear_colour_fills_each_repaint_before_tiles() {
    let config = ViewConfig {
        clear_color: Some([0, 0, 32]),
        ..ViewConfig::default()
    };
    let mut scene = Scene::new(layered_map(10, 10, &[1]), config);
    scene.render().expect("first render");

    scene.view.mark_dirty(40, 40, 8, 8).expect("mark");
    scene.render().expect("render");
    let calls = scene.gfx.calls();
    let fill = calls
        .iter()
        .position(|c| matches!(c, BackendCall::FillRect { .. }))
        .expect("fill");
    let first_tile = calls.iter().position(|c| layer_of(c).is_some()).expect("tile");
    assert!(fill < first_tile);
    assert_eq!(
        calls[fill],
        BackendCall::FillRect {
            x: 32,
            y: 32,
            w: 32,
            h: 32,
            rgb: [0, 0, 32],
        }
    );
}

#[test]
fn camera_offset_moves_blits_into_screen_space() {
    let mut scene = Scene::new(layered_map(40, 40, &[1]), ViewConfig::default());
    scene.view.jump_to(100, 60).expect("jump");
    scene.render().expect("render");
    let first = scene.gfx.blits_of("tiles.png").next().expect("tile");
    // tile (3, 1) is the first one touching the window
    assert!(matches!(first, BackendCall::Blit { dst_x: -4, dst_y: -28, .. }));
    assert!(!scene.view.camera().sees(&PixelRect::new(0, 0, 100, 60)));
}

#[test]
fn missing_tileset_counts_every_skipped_tile() {
    let mut scene = Scene::new(layered_map(4, 4, &[0, 1]), ViewConfig::default());
    scene.gfx.fail_image("tiles.png");
    let hero = sprite(&mut scene.objects, "hero", 1, 0, 0, 16, 16);

    let stats = scene.render().expect("render");
    assert_eq!(stats.tiles, 0);
    // two layers of sixteen, then one tile per layer under the sprite box
    assert_eq!(stats.failed, 2 * 16 + 2);
    assert_eq!(stats.objects, 1);
    assert!(!scene.objects.get(hero).expect("live").is_dirty());
}

#[test]
fn queue_residue_is_reported_with_nothing_pending() {
    let mut scene = Scene::new(layered_map(4, 4, &[2, 0]), ViewConfig::default());
    scene.render().expect("first render");

    let id = sprite(&mut scene.objects, "lost", 1, 0, 0, 8, 8);
    scene.view.enqueue(&mut scene.objects, id).expect("queue");
    assert!(scene.view.pending().is_empty());
    assert!(matches!(
        scene.render(),
        Err(ViewError::QueueResidue { tag: 1, count: 1 })
    ));
    assert!(scene.view.queues().is_empty());
    assert!(!scene.objects.get(id).expect("live").is_dirty());
}
