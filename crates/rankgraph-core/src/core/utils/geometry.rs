use nalgebra::Point3;

/// Arithmetic mean of a set of points, `None` when the set is empty.
pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

/// Smallest pairwise distance between two point sets, `None` if either is empty.
pub fn min_distance(a: &[Point3<f64>], b: &[Point3<f64>]) -> Option<f64> {
    a.iter()
        .flat_map(|p| b.iter().map(move |q| nalgebra::distance_squared(p, q)))
        .min_by(|x, y| x.total_cmp(y))
        .map(f64::sqrt)
}
