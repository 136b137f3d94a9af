use macroquad::prelude::*;
use mapview::{Field, QuadBackend, Reference, TileMap, ViewConfig};

const TILE: u32 = 32;
const MAP_W: u16 = 48;
const MAP_H: u16 = 36;

fn window_conf() -> Conf {
    Conf {
        window_title: "Field".into(),
        window_width: 640,
        window_height: 480,
        ..Default::default()
    }
}

/// Four flat tiles side by side: empty, grass, water, tree.
fn tileset_image() -> Image {
    let mut img = Image::gen_image_color((TILE * 4) as u16, TILE as u16, BLANK);
    let colours = [BLANK, DARKGREEN, BLUE, DARKBROWN];
    for (t, colour) in colours.iter().enumerate() {
        for y in 0..TILE {
            for x in 0..TILE {
                let edge = x == 0 || y == 0;
                let c = if edge && t != 0 { BLACK } else { *colour };
                img.set_pixel(t as u32 * TILE + x, y, c);
            }
        }
    }
    img
}

fn build_map() -> TileMap {
    let mut map = TileMap::new(MAP_W, MAP_H, 2, 0).expect("map");
    let mut ground = vec![1; MAP_W as usize * MAP_H as usize];
    for y in 10..16 {
        for x in 14..24 {
            ground[y * MAP_W as usize + x] = 2;
        }
    }
    map.fill_layer(0, ground).expect("ground plane");
    map.set_layer_tag(1, 1);
    for i in 0..MAP_W.min(MAP_H) {
        if i % 5 == 0 {
            map.set_tile_value(2, i, (i * 7) % MAP_H, 3);
        }
    }
    map
}

/// Config from the first argument, or built-in defaults.
fn view_config() -> anyhow::Result<ViewConfig> {
    match std::env::args().nth(1) {
        Some(path) => ViewConfig::load(path),
        None => Ok(ViewConfig {
            screen_width: 640,
            screen_height: 480,
            tileset: "tiles".into(),
            clear_color: Some([0, 0, 0]),
            ..ViewConfig::default()
        }),
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let config = view_config().expect("Failed to load view config");

    let mut backend = QuadBackend::new(config.screen_width, config.screen_height);
    let tiles = backend.add_texture(Texture2D::from_image(&tileset_image()));
    let hero_tex = backend.add_texture(Texture2D::from_image(&Image::gen_image_color(
        20, 28, RED,
    )));

    let tileset = config.tileset.clone();
    let mut field = Field::new(build_map(), config, backend).expect("Failed to bind map");
    field.images_mut().insert(&tileset, tiles);
    field.images_mut().insert("hero", hero_tex);

    let hero = field.add_object("hero").expect("hero");
    field
        .change_object_image(hero, "hero", 0, 0, 20, 28)
        .expect("hero image");
    field
        .position_object(hero, 320, 270, Reference::BottomLeft)
        .expect("hero position");
    field.tag_object(hero, 1).expect("hero tag");
    field.focus_camera_on(hero).expect("focus");

    loop {
        let mut dx = 0;
        let mut dy = 0;
        if is_key_down(KeyCode::Left) {
            dx -= 2;
        }
        if is_key_down(KeyCode::Right) {
            dx += 2;
        }
        if is_key_down(KeyCode::Up) {
            dy -= 2;
        }
        if is_key_down(KeyCode::Down) {
            dy += 2;
        }
        if let Err(e) = field.move_object(hero, dx, dy) {
            log::debug!("{e}");
        }

        match field.render() {
            Ok(stats) if stats.rects > 0 => log::trace!("{stats:?}"),
            Ok(_) => {}
            Err(e) => log::error!("{e}"),
        }

        clear_background(BLACK);
        field.present();
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 24.0, 24.0, WHITE);

        next_frame().await;
    }
}
