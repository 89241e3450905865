use proptest::prelude::*;
use tessera_geom::Vec3;

fn coord() -> impl Strategy<Value = f32> {
    -1.0e4f32..1.0e4f32
}

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (coord(), coord(), coord()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    // normalized() yields unit length for any non-degenerate input
    #[test]
    fn normalized_is_unit(v in arb_vec3()) {
        prop_assume!(v.length() > 1e-3);
        let n = v.normalized();
        prop_assert!((n.length() - 1.0).abs() < 1e-4);
    }

    // floor_cell returns the cell whose unit cube contains the point
    #[test]
    fn floor_cell_contains_point(v in arb_vec3()) {
        let (cx, cy, cz) = v.floor_cell();
        prop_assert!(cx as f32 <= v.x && v.x < cx as f32 + 1.0);
        prop_assert!(cy as f32 <= v.y && v.y < cy as f32 + 1.0);
        prop_assert!(cz as f32 <= v.z && v.z < cz as f32 + 1.0);
    }

    // along(dir, 0) is the identity
    #[test]
    fn along_zero_is_identity(o in arb_vec3(), d in arb_vec3()) {
        prop_assert_eq!(o.along(d, 0.0), o);
    }
}
