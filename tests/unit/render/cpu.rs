use super::*;

fn solid(width: u32, height: u32, px: [u8; 4]) -> PreparedImage {
    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(px.repeat((width * height) as usize)),
    }
}

fn px(data: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [data[i], data[i + 1], data[i + 2], data[i + 3]]
}

#[test]
fn image_is_drawn_at_its_translation() {
    let canvas = Canvas {
        width: 4,
        height: 4,
    };
    let mut layer = Layer::new(canvas).unwrap();
    let paint = ImagePaint::from_prepared(&solid(2, 2, [255, 0, 0, 255])).unwrap();
    assert_eq!((paint.width, paint.height), (2.0, 2.0));

    layer.draw_image(&paint, Affine::translate((1.0, 1.0)));
    let data = layer.data();
    assert_eq!(px(data, 4, 0, 0)[3], 0);
    assert_eq!(px(data, 4, 3, 3)[3], 0);
    for (x, y) in [(1, 1), (2, 2)] {
        let p = px(data, 4, x, y);
        assert!(p[3] > 200, "pixel ({x},{y}) = {p:?}");
        assert!(p[0] > 200 && p[1] < 30 && p[2] < 30);
    }
}

#[test]
fn outline_covers_border_only() {
    let canvas = Canvas {
        width: 5,
        height: 5,
    };
    let mut layer = Layer::new(canvas).unwrap();
    layer.outline_rects(
        &[Rect::new(0.0, 0.0, 5.0, 5.0)],
        Rgba8Premul {
            r: 255,
            g: 0,
            b: 0,
            a: 255,
        },
    );
    let data = layer.data();
    assert!(px(data, 5, 0, 0)[3] > 200);
    assert!(px(data, 5, 4, 2)[3] > 200);
    assert_eq!(px(data, 5, 2, 2)[3], 0);
}

#[test]
fn oversized_layers_and_images_are_rejected() {
    let huge = Canvas {
        width: 70_000,
        height: 2,
    };
    assert!(matches!(Layer::new(huge), Err(InsigniaError::Surface(_))));

    let bad = PreparedImage {
        width: 2,
        height: 2,
        rgba8_premul: Arc::new(vec![0u8; 3]),
    };
    assert!(ImagePaint::from_prepared(&bad).is_err());
}
