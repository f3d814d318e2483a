//! Building navmeshes from small hand-written meshes.

use std::path::PathBuf;

use approx::assert_relative_eq;
use polynav::{
    AddFaceError, FaceError, FaceId, LoadConfig, LoadError, Navmesh, ParseErrorKind, Point,
    QueryError, VertexId, VertexPlane,
};

fn xy() -> LoadConfig {
    LoadConfig::default().with_plane(VertexPlane::XY)
}

/// The unit square split along its diagonal: faces (A, B, C) and (A, C, D).
fn two_triangles() -> Navmesh {
    let mesh = "\
v 0 0
v 1 0
v 1 1
v 0 1
f 1 2 3
f 1 3 4
";
    Navmesh::from_obj_str(mesh, &xy()).unwrap()
}

#[test]
fn convex_face_forms_a_star() {
    let mesh = "\
v 0 0
v 2 0
v 3 1.5
v 1 3
v -1 1.5
f 1 2 3 4 5
";
    let navmesh = Navmesh::from_obj_str(mesh, &xy()).unwrap();
    let graph = navmesh.graph();
    assert_eq!(navmesh.face_count(), 1);
    assert_eq!(navmesh.portal_count(), 5);
    assert_eq!(graph.node_count(), 6);
    assert_eq!(graph.edge_count(), 5);

    let face = &navmesh.faces()[0];
    let interior = face.interior_node();
    assert_relative_eq!(
        *graph.payload(interior).unwrap(),
        Point::new(1.0, 1.2),
        epsilon = 1e-12
    );

    let mut neighbors = graph
        .neighbors(interior)
        .map(|(_, node)| node)
        .collect::<Vec<_>>();
    neighbors.sort();
    let mut portals = face.portal_nodes().to_vec();
    portals.sort();
    assert_eq!(neighbors, portals);

    let points = face.points();
    for (i, &portal) in face.portal_nodes().iter().enumerate() {
        let expected = (points[i] + points[(i + 1) % points.len()]) / 2.0;
        assert_relative_eq!(*graph.payload(portal).unwrap(), expected, epsilon = 1e-12);
        // Portals of a single face only lead back to its interior.
        let (edge, other) = graph.neighbors(portal).next().unwrap();
        assert_eq!(graph.neighbors(portal).count(), 1);
        assert_eq!(other, interior);
        assert_relative_eq!(
            graph.edge(edge).weight(),
            Point::new(1.0, 1.2).distance(expected),
            epsilon = 1e-12
        );
    }
}

#[test]
fn adjacent_faces_share_one_portal() {
    let navmesh = two_triangles();
    assert_eq!(navmesh.face_count(), 2);
    assert_eq!(navmesh.portal_count(), 5);
    assert_eq!(navmesh.graph().node_count(), 7);
    assert_eq!(navmesh.graph().edge_count(), 6);

    let shared = navmesh.portal(VertexId::new(2), VertexId::new(0)).unwrap();
    assert_eq!(navmesh.portal(VertexId::new(0), VertexId::new(2)), Some(shared));
    for face in navmesh.faces() {
        assert_eq!(
            face.portal_nodes().iter().filter(|&&node| node == shared).count(),
            1
        );
    }
    assert_eq!(navmesh.graph().payload(shared), Some(&Point::new(0.5, 0.5)));
    assert_eq!(navmesh.portal_points(FaceId::new(0)).len(), 3);
}

#[test]
fn portal_creation_is_symmetric() {
    let mut navmesh = Navmesh::new();
    let a = navmesh.add_vertex(Point::new(0.0, 0.0));
    let b = navmesh.add_vertex(Point::new(4.0, 2.0));
    let c = navmesh.add_vertex(Point::new(0.0, 2.0));

    let ab = navmesh.get_or_create_portal(a, b);
    assert_eq!(navmesh.get_or_create_portal(b, a), ab);
    assert_eq!(navmesh.portal_count(), 1);
    assert_eq!(navmesh.graph().node_count(), 1);
    assert_eq!(navmesh.graph().payload(ab), Some(&Point::new(2.0, 1.0)));

    let face = navmesh.add_face(&[a, b, c]).unwrap();
    assert_eq!(navmesh.face(face).unwrap().portal_nodes()[0], ab);
    assert_eq!(navmesh.portal_count(), 3);
}

#[test]
fn locates_faces() {
    let navmesh = two_triangles();
    assert_eq!(
        navmesh.find_face_containing(Point::new(0.75, 0.25)),
        Some(FaceId::new(0))
    );
    assert_eq!(
        navmesh.find_face_containing(Point::new(0.25, 0.75)),
        Some(FaceId::new(1))
    );
    assert_eq!(navmesh.find_face_containing(Point::new(2.0, 2.0)), None);
    assert_eq!(navmesh.find_face_containing(Point::new(-0.1, 0.5)), None);
}

#[test]
fn routes_through_shared_portal() {
    let navmesh = two_triangles();
    let route = navmesh
        .request_path(FaceId::new(0), FaceId::new(1))
        .unwrap();
    assert_eq!(route.len(), 3);
    assert_relative_eq!(route[0], Point::new(2.0 / 3.0, 1.0 / 3.0), epsilon = 1e-12);
    assert_eq!(route[1], Point::new(0.5, 0.5));
    assert_relative_eq!(route[2], Point::new(1.0 / 3.0, 2.0 / 3.0), epsilon = 1e-12);

    let start = navmesh.faces()[0].interior_node();
    let target = navmesh.faces()[1].interior_node();
    let path = navmesh.find_path(start, target).unwrap();
    assert_relative_eq!(path.total_cost, 2.0_f64.sqrt() / 3.0, epsilon = 1e-12);
}

#[test]
fn path_to_itself_is_a_single_node() {
    let navmesh = two_triangles();
    let node = navmesh.faces()[1].interior_node();
    let path = navmesh.find_path(node, node).unwrap();
    assert_eq!(path.nodes, vec![node]);
    assert_eq!(path.total_cost, 0.0);
}

#[test]
fn blocked_portal_disconnects_faces() {
    let mut navmesh = two_triangles();
    let shared = navmesh.portal(VertexId::new(0), VertexId::new(2)).unwrap();
    navmesh.set_blocked(shared, true).unwrap();
    assert!(
        navmesh
            .request_path(FaceId::new(0), FaceId::new(1))
            .unwrap()
            .is_empty()
    );

    navmesh.clear_blocked();
    assert_eq!(
        navmesh
            .request_path(FaceId::new(0), FaceId::new(1))
            .unwrap()
            .len(),
        3
    );
}

#[test]
fn unknown_face_is_an_error() {
    let mut navmesh = two_triangles();
    assert_eq!(
        navmesh.request_path(FaceId::new(0), FaceId::new(7)),
        Err(QueryError::UnknownFace(FaceId::new(7)))
    );
    assert_eq!(
        navmesh.set_interior_point(FaceId::new(2), Point::ZERO),
        Err(QueryError::UnknownFace(FaceId::new(2)))
    );
    assert_eq!(navmesh.interior_point(FaceId::new(2)), None);
    assert!(navmesh.portal_points(FaceId::new(2)).is_empty());
}

#[test]
fn moved_interior_point_shows_up_in_routes() {
    let mut navmesh = two_triangles();
    navmesh
        .set_interior_point(FaceId::new(0), Point::new(0.9, 0.1))
        .unwrap();
    let route = navmesh
        .request_path(FaceId::new(0), FaceId::new(1))
        .unwrap();
    assert_eq!(route[0], Point::new(0.9, 0.1));

    navmesh.reset_interior_point(FaceId::new(0)).unwrap();
    assert_relative_eq!(
        navmesh.interior_point(FaceId::new(0)).unwrap(),
        Point::new(2.0 / 3.0, 1.0 / 3.0),
        epsilon = 1e-12
    );
}

#[test]
fn edge_weights_are_fixed_at_link_time() {
    let mut navmesh = two_triangles();
    let weights = |navmesh: &Navmesh| {
        navmesh
            .graph()
            .edges()
            .iter()
            .map(|edge| edge.weight())
            .collect::<Vec<_>>()
    };
    let before = weights(&navmesh);

    navmesh
        .set_interior_point(FaceId::new(0), Point::new(0.9, 0.1))
        .unwrap();
    assert_eq!(weights(&navmesh), before);

    navmesh.reset_interior_point(FaceId::new(1)).unwrap();
    assert_eq!(weights(&navmesh), before);
}

#[test]
fn non_finite_vertex_is_rejected_without_side_effects() {
    let mut navmesh = Navmesh::new();
    let a = navmesh.add_vertex(Point::new(f64::INFINITY, 0.0));
    let b = navmesh.add_vertex(Point::new(1.0, 0.0));
    let c = navmesh.add_vertex(Point::new(0.0, 1.0));

    assert_eq!(
        navmesh.add_face(&[a, b, c]),
        Err(AddFaceError::Face(FaceError::NonFiniteVertex(a)))
    );
    assert_eq!(navmesh.face_count(), 0);
    assert_eq!(navmesh.portal_count(), 0);
    assert_eq!(navmesh.graph().node_count(), 0);
    assert_eq!(navmesh.graph().edge_count(), 0);
}

#[test]
fn small_scale_keeps_valid_faces() {
    let mesh = "\
v 0 0
v 1 0
v 1 1
v 0 1
f 1 2 3 4
";
    let navmesh = Navmesh::from_obj_str(mesh, &xy().with_scale(1e-5)).unwrap();
    assert_eq!(navmesh.face_count(), 1);
    assert_eq!(
        navmesh.find_face_containing(Point::new(5e-6, 5e-6)),
        Some(FaceId::new(0))
    );
}

#[test]
fn rejected_face_leaves_navmesh_unchanged() {
    let mut navmesh = two_triangles();
    let nodes = navmesh.graph().node_count();
    let a = VertexId::new(0);
    let b = VertexId::new(1);

    assert_eq!(
        navmesh.add_face(&[a, b]),
        Err(AddFaceError::Face(FaceError::TooFewVertices { count: 2 }))
    );
    assert_eq!(
        navmesh.add_face(&[a, b, a]),
        Err(AddFaceError::Face(FaceError::RepeatedVertex(a)))
    );
    assert_eq!(
        navmesh.add_face(&[a, b, VertexId::new(9)]),
        Err(AddFaceError::Face(FaceError::UnknownVertex(VertexId::new(9))))
    );
    assert_eq!(navmesh.face_count(), 2);
    assert_eq!(navmesh.graph().node_count(), nodes);
}

#[test]
fn xz_plane_reads_first_and_third_field() {
    let mesh = "\
v 1 5 2
v 3 7 2
v 3 9 4
f 1 2 3
";
    let navmesh = Navmesh::from_obj_str(mesh, &LoadConfig::default()).unwrap();
    assert_eq!(
        navmesh.vertices(),
        &[
            Point::new(1.0, 2.0),
            Point::new(3.0, 2.0),
            Point::new(3.0, 4.0)
        ]
    );
}

#[test]
fn load_errors_carry_line_numbers() {
    let err = Navmesh::from_obj_str("v 0 0\nf 1 2 3\n", &xy()).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Parse {
            line: 2,
            kind: ParseErrorKind::VertexOutOfRange { index: 2, count: 1 }
        }
    ));

    let err = Navmesh::from_obj_str("# header\nv 1 2\n", &LoadConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Parse {
            line: 2,
            kind: ParseErrorKind::MissingCoordinate {
                required: 3,
                found: 2
            }
        }
    ));

    let err = Navmesh::from_obj_str("v 0 0\nv 1 1\nv 2 2\nf 1 2 3\n", &xy()).unwrap_err();
    assert!(matches!(
        err,
        LoadError::InvalidFace {
            line: 4,
            source: FaceError::Degenerate { .. }
        }
    ));

    let err = Navmesh::from_obj_str("v 1e308 0\n", &xy().with_scale(10.0)).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Parse {
            line: 1,
            kind: ParseErrorKind::TransformOverflow { .. }
        }
    ));

    let err = Navmesh::from_obj_str("v 0 0\nv 1 0\nf 1 2\n", &xy()).unwrap_err();
    assert!(matches!(
        err,
        LoadError::InvalidFace {
            line: 3,
            source: FaceError::TooFewVertices { count: 2 }
        }
    ));
}

#[test]
fn missing_file_reports_path() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("no_such_mesh.obj");
    let err = Navmesh::load(&path, &LoadConfig::default()).unwrap_err();
    match err {
        LoadError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}
