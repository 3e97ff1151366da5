use super::*;

fn checker(w: u32, h: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            let v = if (x + y) % 2 == 0 { 255 } else { 0 };
            out.extend_from_slice(&[v, 0, 255 - v, 255]);
        }
    }
    out
}

#[test]
fn from_rgba8_rejects_bad_inputs() {
    assert!(SourceImage::from_rgba8(0, 4, vec![]).is_err());
    assert!(SourceImage::from_rgba8(2, 2, vec![0; 15]).is_err());
}

#[test]
fn premultiplies_on_load() {
    let img = SourceImage::from_rgba8(1, 1, vec![200, 100, 50, 128]).unwrap();
    assert_eq!(img.premul_rgba8(), &[100, 50, 25, 128]);
}

#[test]
fn token_tracks_content() {
    let a = SourceImage::from_rgba8(4, 4, checker(4, 4)).unwrap();
    let b = SourceImage::from_rgba8(4, 4, checker(4, 4)).unwrap();
    let mut other = checker(4, 4);
    other[0] = 17;
    let c = SourceImage::from_rgba8(4, 4, other).unwrap();
    assert_eq!(a.token(), b.token());
    assert_ne!(a.token(), c.token());
}

#[test]
fn decode_reads_png_bytes() {
    let mut png = Vec::new();
    image::RgbaImage::from_raw(3, 2, checker(3, 2))
        .unwrap()
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    let img = SourceImage::decode(&png).unwrap();
    assert_eq!((img.width(), img.height()), (3, 2));
    assert!(SourceImage::decode(b"not an image").is_err());
}

#[test]
fn cover_fit_fills_portrait_canvas_from_landscape_image() {
    let fit = CoverFit::new(1920, 1080);
    assert!((fit.scale - VIRTUAL_HEIGHT / 1080.0).abs() < 1e-12);
    assert!(fit.offset.x < 0.0);
    assert!(fit.offset.y.abs() < 1e-9);
    let covered = fit.image_to_canvas().transform_rect_bbox(Rect::new(0.0, 0.0, 1920.0, 1080.0));
    assert!(covered.x0 <= 0.0 && covered.x1 >= VIRTUAL_WIDTH);
    assert!((covered.y1 - VIRTUAL_HEIGHT).abs() < 1e-9);
}

#[test]
fn canvas_to_source_inverts_the_fit() {
    let fit = CoverFit::new(800, 1600);
    let canvas = Rect::new(100.0, 200.0, 172.0, 271.25);
    let src = fit.canvas_to_source(canvas);
    let back = fit.image_to_canvas().transform_rect_bbox(src);
    assert!((back.x0 - canvas.x0).abs() < 1e-9);
    assert!((back.y1 - canvas.y1).abs() < 1e-9);
}
