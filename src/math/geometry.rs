use nalgebra::{Point3, Rotation3, UnitQuaternion, Vector3};

pub fn reject(u: &Vector3<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    // Computes the vector rejection of u from v. v must be non-zero.
    let u_proj_v = u.dot(v) * v / v.norm_squared();
    u - u_proj_v
}

/// Position on a circular orbit of the given radius, lying in the xz-plane.
/// The angle is measured from the x-axis towards the z-axis.
pub fn orbit_position(radius: f64, angle: f64) -> Point3<f64> {
    Point3::new(radius * angle.cos(), 0.0, radius * angle.sin())
}

/// Returns a rotation that points the local z-axis along `to_viewer` while keeping
/// the local y-axis as close to `up` as possible.
///
/// When `to_viewer` is (nearly) parallel to `up`, there's no good choice for the
/// local y-axis, so we fall back to the one perpendicular direction that's closest
/// to -z. If `to_viewer` is too small to have a direction at all, this returns the
/// identity.
pub fn billboard_rotation(
    to_viewer: &Vector3<f64>,
    up: &Vector3<f64>,
    tolerance: f64,
) -> UnitQuaternion<f64> {
    if to_viewer.norm() < tolerance {
        return UnitQuaternion::identity();
    }

    let mut new_y = reject(up, to_viewer);
    if new_y.norm() < tolerance {
        new_y = reject(&-Vector3::z(), to_viewer);
        if new_y.norm() < tolerance {
            new_y = Vector3::y();
        }
    }

    let mut rotation = Rotation3::face_towards(to_viewer, &new_y);
    rotation.renormalize();
    UnitQuaternion::from_rotation_matrix(&rotation)
}

pub fn path_iter_parametric<F, S>(
    f: F,
    t_start: S,
    t_end: S,
    num_segments: usize,
) -> impl Iterator<Item = Point3<f32>>
where
    F: Fn(S) -> Point3<f32>,
    S: nalgebra::RealField + simba::scalar::SupersetOf<usize> + Copy,
{
    assert!(
        num_segments >= 1,
        "Must have at least one segment, num_segments was {}",
        num_segments
    );
    let convert = nalgebra::convert::<usize, S>;
    (0..=num_segments)
        .map(move |i| convert(i) / convert(num_segments))
        // u ranges from 0 to 1 (inclusive)
        .map(move |u| t_start + u * (t_end - t_start))
        .map(f)
}

/// Triangulates a flat annulus in the xz-plane, centered on the origin.
///
/// Vertices alternate inner/outer around the circle; the first and last pairs
/// coincide so the seam is closed without wrapping indices.
pub fn annulus(
    inner_radius: f32,
    outer_radius: f32,
    segments: usize,
) -> (Vec<Point3<f32>>, Vec<Point3<u16>>) {
    let circle = |r: f32| move |theta: f32| Point3::new(r * theta.cos(), 0.0, r * theta.sin());
    let tau = std::f32::consts::TAU;

    let inner = path_iter_parametric(circle(inner_radius), 0.0, tau, segments);
    let outer = path_iter_parametric(circle(outer_radius), 0.0, tau, segments);

    let mut vertices = Vec::with_capacity(2 * (segments + 1));
    for (a, b) in inner.zip(outer) {
        vertices.push(a);
        vertices.push(b);
    }

    let mut faces = Vec::with_capacity(2 * segments);
    for i in 0..segments {
        let (i0, o0) = (2 * i as u16, 2 * i as u16 + 1);
        let (i1, o1) = (i0 + 2, o0 + 2);
        faces.push(Point3::new(i0, o0, o1));
        faces.push(Point3::new(i0, o1, i1));
    }

    (vertices, faces)
}
