use std::{collections::HashMap, io::Cursor};

use super::*;
use crate::{
    assets::{
        loader::ImageFetcher,
        resolve::ExtensionResolver,
    },
    foundation::error::{InsigniaError, InsigniaResult},
    select::{context::UserContext, engine::select},
};

const FIXTURE: &str = include_str!("../../fixtures/catalog.json");
const BG: [u8; 4] = [20, 40, 60, 255];
const RANK: [u8; 4] = [200, 200, 0, 255];
const PARA: [u8; 4] = [0, 160, 0, 255];

fn png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

struct MapFetcher(HashMap<String, Vec<u8>>);

impl ImageFetcher for MapFetcher {
    fn fetch(&self, url: &str) -> InsigniaResult<Vec<u8>> {
        self.0
            .get(url)
            .cloned()
            .ok_or_else(|| InsigniaError::asset(format!("missing '{url}'")))
    }
}

fn assets() -> HashMap<String, Vec<u8>> {
    let mut files = HashMap::new();
    files.insert("backgrounds/ba-enlisted.png".to_string(), png(300, 200, BG));
    files.insert("ranks/sergeant.png".to_string(), png(40, 20, RANK));
    files.insert("quals/paratrooper.png".to_string(), png(30, 30, PARA));
    for i in 1..=10 {
        files.insert(
            format!("ribbons/award-{i}.png"),
            png(60, 16, [10 * i as u8, 0, 200, 255]),
        );
    }
    files
}

fn test_config() -> RenderConfig {
    RenderConfig {
        rack_anchors: [[150.0, 150.0]; 4],
        ..RenderConfig::default()
    }
}

fn compositor(files: HashMap<String, Vec<u8>>, config: RenderConfig) -> Compositor {
    Compositor::new(
        Arc::new(ImageLoader::new(MapFetcher(files))),
        Arc::new(ExtensionResolver::default()),
        config,
    )
}

fn render(
    groups: &[&str],
    badges: &[&str],
    files: HashMap<String, Vec<u8>>,
    config: RenderConfig,
) -> CompositedPortrait {
    let catalog = AssetCatalog::from_json_str(FIXTURE).unwrap();
    let user = UserContext::from_names(groups.iter().copied(), badges.iter().copied());
    let plan = select(&user, &catalog);
    compositor(files, config).composite(&plan, &catalog).unwrap()
}

fn close(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b).all(|(x, y)| (i16::from(*x) - i16::from(y)).abs() <= 2)
}

#[test]
fn surface_takes_background_size_and_stacks_foregrounds() {
    let out = render(&["Sergeant"], &["Paratrooper"], assets(), test_config());
    assert_eq!((out.surface.width(), out.surface.height()), (300, 200));
    assert!(close(out.surface.pixel(150, 100).unwrap(), PARA));
    assert!(close(out.surface.pixel(132, 92).unwrap(), RANK));
    assert!(close(out.surface.pixel(10, 10).unwrap(), BG));
}

#[test]
fn rank_regions_are_offset_by_centering_and_quals_are_not() {
    let out = render(&["Sergeant"], &["Paratrooper"], assets(), test_config());
    let rects: Vec<Rect> = out.hit_regions.iter().map(|r| r.rect).collect();
    assert_eq!(
        rects,
        vec![
            Rect::new(132.0, 93.0, 142.0, 99.0),
            Rect::new(40.0, 10.0, 52.0, 18.0)
        ]
    );
    assert_eq!(
        out.hit_regions[0].content,
        "<img src=\"tooltips/sergeant.png\" alt=\"\" class=\"insignia-tooltip-image\"><p>Sergeant</p>"
    );
    assert_eq!(out.hit_regions[1].content, "<p>Basic Parachute Course</p>");
}

#[test]
fn missing_rank_image_drops_rank_regions() {
    let mut files = assets();
    files.remove("ranks/sergeant.png");
    let out = render(&["Sergeant"], &["Paratrooper"], files, test_config());
    assert_eq!(out.hit_regions.len(), 1);
    assert_eq!(out.hit_regions[0].rect, Rect::new(40.0, 10.0, 52.0, 18.0));
}

#[test]
fn missing_background_gives_degenerate_surface() {
    let mut files = assets();
    files.remove("backgrounds/ba-enlisted.png");
    let out = render(&["Sergeant"], &[], files, test_config());
    assert_eq!((out.surface.width(), out.surface.height()), (1, 1));
}

#[test]
fn group_and_lanyard_regions_are_registered() {
    let out = render(&["Corporal", "16CSMR"], &[], assets(), test_config());
    let contents: Vec<&str> = out.hit_regions.iter().map(|r| r.content.as_str()).collect();
    assert_eq!(out.hit_regions[0].rect, Rect::new(60.0, 4.0, 70.0, 14.0));
    assert!(contents[0].contains("16 Close Support Medical Regiment"));
    assert_eq!(out.hit_regions[1].rect, Rect::new(70.0, 30.0, 78.0, 50.0));
    assert_eq!(contents[1], "<p>16CSMR lanyard</p>");
}

#[test]
fn lanyard_region_skipped_for_alternate_service() {
    let out = render(&["Flight Sergeant", "16CSMR"], &[], assets(), test_config());
    assert_eq!(out.hit_regions.len(), 1);
    assert!(out.hit_regions[0].content.contains("16 Close Support"));
}

#[test]
fn rack_keeps_eight_highest_priority_awards() {
    let badges: Vec<String> = (1..=10).rev().map(|i| format!("Award {i}")).collect();
    let badges: Vec<&str> = badges.iter().map(String::as_str).collect();
    let out = render(&["Sergeant"], &badges, assets(), test_config());

    let awards: Vec<&HitRegion> = out
        .hit_regions
        .iter()
        .filter(|r| r.content.contains(" award"))
        .collect();
    assert_eq!(awards.len(), 8);
    assert!(awards.iter().all(|r| !r.content.contains("Ninth") && !r.content.contains("Tenth")));
    assert!(awards[0].content.contains("Eighth award"));
    assert_eq!(
        awards[7].content,
        "<img src=\"medals/award-1.png\" alt=\"\" class=\"insignia-tooltip-image\"><p>First award</p>"
    );
    for r in &awards {
        assert!(r.rect.width() > 0.0 && r.rect.height() > 0.0);
        assert!(out.surface.canvas().rect().contains(r.rect.center()));
    }
}

#[test]
fn unloadable_ribbon_lets_the_next_award_in() {
    let mut files = assets();
    files.remove("ribbons/award-1.png");
    let badges: Vec<String> = (1..=10).map(|i| format!("Award {i}")).collect();
    let badges: Vec<&str> = badges.iter().map(String::as_str).collect();
    let out = render(&["Sergeant"], &badges, files, test_config());

    let awards: Vec<&HitRegion> = out
        .hit_regions
        .iter()
        .filter(|r| r.content.contains(" award"))
        .collect();
    assert_eq!(awards.len(), 8);
    assert!(awards.iter().all(|r| !r.content.contains("First award")));
    assert!(awards[0].content.contains("Ninth award"));
    assert!(awards[7].content.contains("Second award"));
}

#[test]
fn rack_is_drawn_near_its_anchor() {
    let out = render(&["Sergeant"], &["Award 3"], assets(), test_config());
    let award = out
        .hit_regions
        .iter()
        .find(|r| r.content.contains("Third award"))
        .unwrap();
    let c = award.rect.center();
    assert!((c.x - 150.0).abs() < 2.0 && (c.y - 150.0).abs() < 2.0);
    let px = out.surface.pixel(150, 150).unwrap();
    assert!(close(px, [30, 0, 200, 255]), "{px:?}");
}

#[test]
fn missing_ribbons_are_skipped() {
    let mut files = assets();
    files.remove("ribbons/award-2.png");
    let out = render(&["Sergeant"], &["Award 1", "Award 2"], files, test_config());
    let awards = out
        .hit_regions
        .iter()
        .filter(|r| r.content.contains(" award"))
        .count();
    assert_eq!(awards, 1);
}

#[test]
fn debug_outlines_are_red() {
    let config = RenderConfig {
        debug: true,
        ..test_config()
    };
    let out = render(&["Sergeant"], &["Paratrooper"], assets(), config);
    assert_eq!(out.surface.pixel(40, 10).unwrap(), [255, 0, 0, 255]);
    assert!(close(out.surface.pixel(46, 14).unwrap(), BG));

    let c = compositor(assets(), test_config()).with_runtime_debug(true);
    assert!(c.debug_enabled());
}

#[test]
fn rack_order_sorts_caps_and_reverses() {
    let catalog = AssetCatalog::from_json_str(FIXTURE).unwrap();
    let layer = |name: &str, ribbon: &str| AwardLayer {
        name: name.to_string(),
        ribbon: ImageRef::new(ribbon),
    };
    let awards = vec![
        layer("Unknown", "ribbons/unknown"),
        layer("Award 3", "ribbons/award-3"),
        layer("Award 1", "ribbons/award-1"),
        layer("Renamed", "ribbons/award-2"),
    ];
    let names: Vec<&str> = rack_order(&awards, &catalog, 3)
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names, vec!["Award 3", "Renamed", "Award 1"]);
}
