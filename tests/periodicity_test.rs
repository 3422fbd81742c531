//! Periodic boundary identification in 1D, 2D and 3D.

use dg_mesh::{
    ConnectivityConfig, ElementShape, MeshData, MeshError, PeriodicityConfig, ReferenceElement, uniform_mesh,
};

fn periodic(shape: ElementShape, order: usize, cells: &[usize], axes: &[bool]) -> Result<MeshData, MeshError> {
    let rd = ReferenceElement::new(shape, order);
    let (vertices, etov) = uniform_mesh(shape, cells)?;
    MeshData::new(&rd, vertices, etov, &ConnectivityConfig::default())?
        .make_periodic(axes, &PeriodicityConfig::default())
}

fn assert_closed(md: &MeshData) {
    assert!(md.map_b().is_empty(), "{} boundary nodes remain", md.map_b().len());
    let ftof = md.ftof();
    for (f, &g) in ftof.iter().enumerate() {
        assert_ne!(f, g, "face {} is still a boundary face", f);
        assert_eq!(ftof[g], f);
    }
    let map_p = md.map_p();
    for (i, &p) in map_p.iter().enumerate() {
        assert_eq!(map_p[p], i);
    }
}

#[test]
fn test_periodic_line() {
    let md = periodic(ElementShape::Line, 2, &[5], &[true]).unwrap();
    assert_closed(&md);
    assert_eq!(md.is_periodic(), &[true]);
}

#[test]
fn test_periodic_quad_and_triangle() {
    assert_closed(&periodic(ElementShape::Quad, 3, &[3, 2], &[true, true]).unwrap());
    assert_closed(&periodic(ElementShape::Tri, 2, &[2, 3], &[true, true]).unwrap());
}

#[test]
fn test_periodic_hex() {
    assert_closed(&periodic(ElementShape::Hex, 2, &[2, 2, 3], &[true, true, true]).unwrap());
}

#[test]
fn test_single_axis_keeps_other_walls() {
    let rd = ReferenceElement::new(ElementShape::Quad, 2);
    let md = periodic(ElementShape::Quad, 2, &[4, 3], &[true, false]).unwrap();
    let nfp = rd.n_face_points();
    // bottom and top walls remain
    assert_eq!(md.map_b().len(), 2 * 4 * nfp);

    let n_rows = md.xf[0].nrows();
    let coord = |d: usize, g: usize| md.xf[d][(g % n_rows, g / n_rows)];
    for (i, &p) in md.map_p().iter().enumerate() {
        let dx = (coord(0, i) - coord(0, p)).abs();
        assert!(dx < 1e-12 || (dx - 2.0).abs() < 1e-12, "x offset {} is not a period", dx);
        assert!((coord(1, i) - coord(1, p)).abs() < 1e-12);
    }
}

#[test]
fn test_rotated_square_is_a_mismatch() {
    let rd = ReferenceElement::new(ElementShape::Quad, 2);
    let (vertices, etov) = uniform_mesh(ElementShape::Quad, &[2, 2]).unwrap();
    let (c, s) = (std::f64::consts::FRAC_PI_4.cos(), std::f64::consts::FRAC_PI_4.sin());
    let rotated = vec![
        vertices[0].iter().zip(&vertices[1]).map(|(x, y)| c * x - s * y).collect(),
        vertices[0].iter().zip(&vertices[1]).map(|(x, y)| s * x + c * y).collect(),
    ];
    let md = MeshData::new(&rd, rotated, etov, &ConnectivityConfig::default()).unwrap();
    let result = md.make_periodic(&[true, false], &PeriodicityConfig::default());
    assert!(matches!(result, Err(MeshError::PeriodicityMismatch { axis: 0, .. })));
}
