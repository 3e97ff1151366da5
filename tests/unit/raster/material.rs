use super::*;

#[test]
fn serde_names_match_name() {
    for m in Material::ALL {
        assert_eq!(serde_json::to_string(&m).unwrap(), format!("\"{}\"", m.name()));
    }
}

#[test]
fn texels_are_translucent_overlays() {
    for m in Material::ALL {
        for (x, y) in [(0, 0), (13, 77), (400, 900), (1079, 2279)] {
            let t = m.texel(x, y, 1.0, 42);
            assert!(t.a > 0 && t.a < 160, "{m:?} at ({x},{y}) alpha {}", t.a);
        }
    }
}

#[test]
fn noise_is_deterministic_and_bounded() {
    for i in 0..500u32 {
        let a = hash_unit(i, i * 7, 9);
        assert_eq!(a, hash_unit(i, i * 7, 9));
        assert!((0.0..1.0).contains(&a));
    }
    assert_ne!(hash_unit(1, 2, 3), hash_unit(1, 2, 4));
}

#[test]
fn generated_texture_matches_requested_size() {
    let tex = MaterialTexture::generate(Material::Wood, 24, 40, 0.5, 1).unwrap();
    assert_eq!(tex.material(), Material::Wood);
    assert_eq!(tex.pixmap.width(), 24);
    assert_eq!(tex.pixmap.height(), 40);
    assert!(MaterialTexture::generate(Material::Glass, 0, 4, 1.0, 1).is_err());
}
