use crate::{require_channels, require_finite, ImgprocError, Result};
use ifp_core::{Circle, Image, Rect};
use nalgebra::Point2;
use std::collections::VecDeque;

/// Closed boundary as an ordered list of pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Contour {
    pub points: Vec<(i32, i32)>,
}

impl Contour {
    pub fn new(points: Vec<(i32, i32)>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl From<Vec<(i32, i32)>> for Contour {
    fn from(points: Vec<(i32, i32)>) -> Self {
        Self::new(points)
    }
}

const DIRS_8: [(i32, i32); 8] = [
    (1, 0),   // E
    (1, 1),   // SE
    (0, 1),   // S
    (-1, 1),  // SW
    (-1, 0),  // W
    (-1, -1), // NW
    (0, -1),  // N
    (1, -1),  // NE
];

const DIRS_4: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

fn in_bounds(x: i32, y: i32, w: i32, h: i32) -> bool {
    x >= 0 && y >= 0 && x < w && y < h
}

fn is_foreground(data: &[u8], w: i32, h: i32, x: i32, y: i32) -> bool {
    in_bounds(x, y, w, h) && data[(y * w + x) as usize] > 0
}

/// Background pixels 4-connected to the image border.
fn outside_background(data: &[u8], w: i32, h: i32) -> Vec<bool> {
    let mut outside = vec![false; data.len()];
    let mut queue = VecDeque::new();

    let mut seed = |x: i32, y: i32, queue: &mut VecDeque<(i32, i32)>| {
        let idx = (y * w + x) as usize;
        if data[idx] == 0 && !outside[idx] {
            outside[idx] = true;
            queue.push_back((x, y));
        }
    };
    for x in 0..w {
        seed(x, 0, &mut queue);
        seed(x, h - 1, &mut queue);
    }
    for y in 0..h {
        seed(0, y, &mut queue);
        seed(w - 1, y, &mut queue);
    }

    while let Some((cx, cy)) = queue.pop_front() {
        for (dx, dy) in DIRS_4 {
            let nx = cx + dx;
            let ny = cy + dy;
            if !in_bounds(nx, ny, w, h) {
                continue;
            }
            let nidx = (ny * w + nx) as usize;
            if data[nidx] == 0 && !outside[nidx] {
                outside[nidx] = true;
                queue.push_back((nx, ny));
            }
        }
    }
    outside
}

/// Raster-first pixel of every 8-connected component that borders the
/// outside background or the image edge.
fn external_components(data: &[u8], w: i32, h: i32) -> Vec<(i32, i32)> {
    let outside = outside_background(data, w, h);
    let mut labelled = vec![false; data.len()];
    let mut starts = Vec::new();
    let mut queue = VecDeque::new();

    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            if data[idx] == 0 || labelled[idx] {
                continue;
            }

            labelled[idx] = true;
            queue.push_back((x, y));
            let mut external = false;

            while let Some((cx, cy)) = queue.pop_front() {
                if cx == 0 || cy == 0 || cx == w - 1 || cy == h - 1 {
                    external = true;
                }
                for (dx, dy) in DIRS_4 {
                    let (nx, ny) = (cx + dx, cy + dy);
                    if in_bounds(nx, ny, w, h) && outside[(ny * w + nx) as usize] {
                        external = true;
                    }
                }
                for (dx, dy) in DIRS_8 {
                    let (nx, ny) = (cx + dx, cy + dy);
                    if !in_bounds(nx, ny, w, h) {
                        continue;
                    }
                    let nidx = (ny * w + nx) as usize;
                    if data[nidx] == 0 || labelled[nidx] {
                        continue;
                    }
                    labelled[nidx] = true;
                    queue.push_back((nx, ny));
                }
            }

            if external {
                starts.push((x, y));
            }
        }
    }
    starts
}

/// Next boundary pixel clockwise from the backtrack direction `back`.
fn next_boundary_step(
    data: &[u8],
    w: i32,
    h: i32,
    current: (i32, i32),
    back: usize,
) -> Option<((i32, i32), usize)> {
    (1..=8).map(|step| (back + step) % 8).find_map(|k| {
        let nx = current.0 + DIRS_8[k].0;
        let ny = current.1 + DIRS_8[k].1;
        is_foreground(data, w, h, nx, ny).then_some(((nx, ny), k))
    })
}

// Direction from the pixel reached via `k` to the last background pixel
// examined before it.
fn backtrack_after(k: usize) -> usize {
    if k % 2 == 0 {
        (k + 6) % 8
    } else {
        (k + 5) % 8
    }
}

/// Moore-neighbour trace starting at the raster-first pixel of a component.
fn trace_boundary(data: &[u8], w: i32, h: i32, start: (i32, i32)) -> Vec<(i32, i32)> {
    // Everything west of and above the start pixel is background.
    let Some((second, k0)) = next_boundary_step(data, w, h, start, 4) else {
        return vec![start];
    };

    let mut contour = vec![start];
    let mut current = second;
    let mut back = backtrack_after(k0);
    let max_steps = (w as usize * h as usize).saturating_mul(8).max(32);

    for _ in 0..max_steps {
        let Some((next, k)) = next_boundary_step(data, w, h, current, back) else {
            break;
        };
        if current == start && next == second {
            break;
        }
        contour.push(current);
        current = next;
        back = backtrack_after(k);
    }
    contour
}

/// Drop points that continue a straight run, keeping the corners.
fn compress_runs(points: Vec<(i32, i32)>) -> Vec<(i32, i32)> {
    let n = points.len();
    if n < 3 {
        return points;
    }
    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            (cur.0 - prev.0, cur.1 - prev.1) != (next.0 - cur.0, next.1 - cur.1)
        })
        .map(|i| points[i])
        .collect()
}

/// Outer boundaries of the 8-connected foreground regions of a binary mask
/// (non-zero pixels are foreground). Regions lying inside a hole of another
/// region are skipped. Straight runs are compressed to their end points and
/// contours come out in raster order of each region's first pixel.
pub fn find_external_contours(binary: &Image) -> Result<Vec<Contour>> {
    require_channels(binary, 1, "contour extraction")?;
    let w = binary.width() as i32;
    let h = binary.height() as i32;
    let data = binary.as_raw();

    let contours: Vec<Contour> = external_components(data, w, h)
        .into_iter()
        .map(|start| Contour::new(compress_runs(trace_boundary(data, w, h, start))))
        .collect();

    tracing::trace!(count = contours.len(), "external contours");
    Ok(contours)
}

/// Shoelace area; positive for contours traced by [`find_external_contours`].
pub fn contour_signed_area(contour: &Contour) -> f64 {
    let n = contour.points.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0f64;
    for i in 0..n {
        let (x0, y0) = contour.points[i];
        let (x1, y1) = contour.points[(i + 1) % n];
        area += x0 as f64 * y1 as f64 - x1 as f64 * y0 as f64;
    }
    area * 0.5
}

/// Polygon area (shoelace). Contour should be ordered.
pub fn contour_area(contour: &Contour) -> f64 {
    contour_signed_area(contour).abs()
}

/// Closed-contour perimeter.
pub fn contour_perimeter(contour: &Contour) -> f64 {
    let n = contour.points.len();
    if n < 2 {
        return 0.0;
    }
    let mut p = 0.0f64;
    for i in 0..n {
        let (x0, y0) = contour.points[i];
        let (x1, y1) = contour.points[(i + 1) % n];
        let dx = (x1 - x0) as f64;
        let dy = (y1 - y0) as f64;
        p += (dx * dx + dy * dy).sqrt();
    }
    p
}

fn require_points(contour: &Contour, op: &str) -> Result<()> {
    if contour.points.is_empty() {
        return Err(ImgprocError::EmptyInput(format!("{op} needs at least one point")));
    }
    Ok(())
}

/// Smallest upright rectangle covering every point, extents inclusive.
pub fn bounding_rect(contour: &Contour) -> Result<Rect> {
    require_points(contour, "bounding rectangle")?;
    let mut min_x = i32::MAX;
    let mut min_y = i32::MAX;
    let mut max_x = i32::MIN;
    let mut max_y = i32::MIN;
    for &(x, y) in &contour.points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    Ok(Rect::new(
        min_x,
        min_y,
        max_x.abs_diff(min_x) + 1,
        max_y.abs_diff(min_y) + 1,
    ))
}

/// Contour with the largest area. When several share the largest area the
/// one appearing last wins.
pub fn largest_contour(contours: &[Contour]) -> Option<&Contour> {
    contours
        .iter()
        .map(|c| (c, contour_area(c)))
        .reduce(|best, cand| if best.1 > cand.1 { best } else { cand })
        .map(|(c, _)| c)
}

fn point_line_distance(p: (i32, i32), a: (i32, i32), b: (i32, i32)) -> f64 {
    let (px, py) = (p.0 as f64, p.1 as f64);
    let (ax, ay) = (a.0 as f64, a.1 as f64);
    let (bx, by) = (b.0 as f64, b.1 as f64);
    let dx = bx - ax;
    let dy = by - ay;
    if dx == 0.0 && dy == 0.0 {
        let ex = px - ax;
        let ey = py - ay;
        return (ex * ex + ey * ey).sqrt();
    }
    let t = ((px - ax) * dx + (py - ay) * dy) / (dx * dx + dy * dy);
    let proj_x = ax + t * dx;
    let proj_y = ay + t * dy;
    let ex = px - proj_x;
    let ey = py - proj_y;
    (ex * ex + ey * ey).sqrt()
}

fn rdp(points: &[(i32, i32)], epsilon: f64, out: &mut Vec<(i32, i32)>) {
    if points.len() < 2 {
        return;
    }
    let first = points[0];
    let last = points[points.len() - 1];
    let mut max_dist = 0.0f64;
    let mut idx = 0usize;
    for (i, &p) in points
        .iter()
        .enumerate()
        .skip(1)
        .take(points.len().saturating_sub(2))
    {
        let d = point_line_distance(p, first, last);
        if d > max_dist {
            max_dist = d;
            idx = i;
        }
    }

    if max_dist > epsilon && idx > 0 {
        rdp(&points[..=idx], epsilon, out);
        out.pop();
        rdp(&points[idx..], epsilon, out);
    } else {
        out.push(first);
        out.push(last);
    }
}

fn farthest_from(points: &[(i32, i32)], from: usize) -> usize {
    let (fx, fy) = points[from];
    let mut best = 0i64;
    let mut idx = from;
    for (i, &(x, y)) in points.iter().enumerate() {
        let dx = (x - fx) as i64;
        let dy = (y - fy) as i64;
        let d = dx * dx + dy * dy;
        if d > best {
            best = d;
            idx = i;
        }
    }
    idx
}

/// Douglas-Peucker simplification of a closed contour with tolerance
/// `epsilon_fraction * perimeter`.
///
/// The curve is split at two mutually distant points and each arc is
/// simplified on its own, so the contour's starting pixel survives only if
/// it is a real corner.
pub fn approx_polygon(contour: &Contour, epsilon_fraction: f64) -> Result<Contour> {
    require_finite(epsilon_fraction, "epsilon fraction")?;
    if epsilon_fraction < 0.0 {
        return Err(ImgprocError::InvalidParameter(format!(
            "epsilon fraction must be non-negative, got {epsilon_fraction}"
        )));
    }
    require_points(contour, "polygon approximation")?;

    let mut pts = contour.points.clone();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    if pts.len() < 3 {
        return Ok(Contour::new(pts));
    }
    let epsilon = epsilon_fraction * contour_perimeter(contour);

    let start = farthest_from(&pts, 0);
    pts.rotate_left(start);
    let split = farthest_from(&pts, 0);
    if split == 0 {
        return Ok(Contour::new(vec![pts[0]]));
    }

    let mut out = Vec::new();
    rdp(&pts[..=split], epsilon, &mut out);
    out.pop();
    let mut tail = pts[split..].to_vec();
    tail.push(pts[0]);
    rdp(&tail, epsilon, &mut out);
    out.pop();

    out.dedup();
    if out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    Ok(Contour::new(out))
}

fn to_point(p: (i32, i32)) -> Point2<f64> {
    Point2::new(p.0 as f64, p.1 as f64)
}

fn circle_from_two(a: &Point2<f64>, b: &Point2<f64>) -> Circle {
    Circle::new(nalgebra::center(a, b), nalgebra::distance(a, b) * 0.5)
}

fn circle_from_three(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Circle {
    let bx = b.x - a.x;
    let by = b.y - a.y;
    let cx = c.x - a.x;
    let cy = c.y - a.y;
    let d = 2.0 * (bx * cy - by * cx);
    if d.abs() < 1e-12 {
        // Collinear: the widest pair spans the other point.
        return [circle_from_two(a, b), circle_from_two(a, c), circle_from_two(b, c)]
            .into_iter()
            .fold(Circle::new(*a, 0.0), |best, cand| {
                if cand.radius > best.radius {
                    cand
                } else {
                    best
                }
            });
    }
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    let ux = (cy * b2 - by * c2) / d;
    let uy = (bx * c2 - cx * b2) / d;
    Circle::from_xyr(a.x + ux, a.y + uy, (ux * ux + uy * uy).sqrt())
}

const CIRCLE_EPS: f64 = 1e-7;

/// Smallest circle enclosing every contour point (Welzl, incremental form).
pub fn min_enclosing_circle(contour: &Contour) -> Result<Circle> {
    require_points(contour, "minimum enclosing circle")?;
    let pts: Vec<Point2<f64>> = contour.points.iter().copied().map(to_point).collect();

    let mut circle = Circle::new(pts[0], 0.0);
    for i in 1..pts.len() {
        if circle.contains(&pts[i], CIRCLE_EPS) {
            continue;
        }
        circle = Circle::new(pts[i], 0.0);
        for j in 0..i {
            if circle.contains(&pts[j], CIRCLE_EPS) {
                continue;
            }
            circle = circle_from_two(&pts[i], &pts[j]);
            for k in 0..j {
                if !circle.contains(&pts[k], CIRCLE_EPS) {
                    circle = circle_from_three(&pts[i], &pts[j], &pts[k]);
                }
            }
        }
    }
    Ok(circle)
}
