use crate::GeometryError;
use nalgebra::{Point2, Rotation2, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Camera distance, in tree-radius units, that puts a light on the unit
/// circle exactly at the given projection angle.
///
/// Fails for a non-finite angle or one whose sine vanishes (0 or π).
pub fn camera_distance_from_angle(angle: f64) -> Result<f64, GeometryError> {
    if !angle.is_finite() {
        return Err(GeometryError::DegenerateAngle { angle });
    }
    let s = angle.sin().abs();
    if s < 1e-9 {
        return Err(GeometryError::DegenerateAngle { angle });
    }
    Ok(1.0 / s)
}

/// Estimated viewpoint of one photograph.
///
/// The spherical part (`distance`, `polar`, `azimuth`) is expressed in the
/// photograph's own frame, where the camera looks from the `-y` side toward
/// the tree axis. `angle_estimate` rotates that frame about the tree axis
/// into the common reconstruction frame. `origin` is the pixel `(column,
/// row)` the camera believes the tree axis projects to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPosition {
    distance: f64,
    polar: f64,
    azimuth: f64,
    pub angle_estimate: f64,
    pub origin: Point2<f64>,
}

impl CameraPosition {
    /// Camera at `distance` on the `-y` axis, level with the tree center.
    pub fn new(distance: f64, origin: Point2<f64>) -> Result<Self, GeometryError> {
        check_distance(distance)?;
        Ok(Self {
            distance,
            polar: FRAC_PI_2,
            azimuth: -FRAC_PI_2,
            angle_estimate: 0.0,
            origin,
        })
    }

    pub fn from_cartesian(p: Vector3<f64>, origin: Point2<f64>) -> Result<Self, GeometryError> {
        if p.x == 0.0 && p.y == 0.0 {
            return Err(GeometryError::OnTreeAxis);
        }
        let distance = p.norm();
        check_distance(distance)?;
        Ok(Self {
            distance,
            polar: (p.z / distance).acos(),
            azimuth: p.y.atan2(p.x),
            angle_estimate: 0.0,
            origin,
        })
    }

    #[inline]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    #[inline]
    pub fn polar(&self) -> f64 {
        self.polar
    }

    #[inline]
    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    /// Distance from the tree axis in the horizontal plane.
    #[inline]
    pub fn ground_distance(&self) -> f64 {
        self.distance * self.polar.sin()
    }

    /// Change the distance, keeping the direction.
    pub fn set_distance(&mut self, distance: f64) -> Result<(), GeometryError> {
        check_distance(distance)?;
        self.distance = distance;
        Ok(())
    }

    /// Position in the photograph's own frame.
    pub fn cartesian(&self) -> Vector3<f64> {
        let (sp, cp) = self.polar.sin_cos();
        let (sa, ca) = self.azimuth.sin_cos();
        Vector3::new(self.distance * sp * ca, self.distance * sp * sa, self.distance * cp)
    }

    /// Horizontal position in the common frame.
    pub fn world_position(&self) -> Point2<f64> {
        let local = self.cartesian();
        Rotation2::new(self.angle_estimate) * Point2::new(local.x, local.y)
    }
}

fn check_distance(distance: f64) -> Result<(), GeometryError> {
    if !distance.is_finite() || distance <= 0.0 {
        return Err(GeometryError::InvalidDistance { distance });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_4, PI};

    #[test]
    fn right_angle_gives_unit_distance() {
        assert_relative_eq!(camera_distance_from_angle(FRAC_PI_2).unwrap(), 1.0);
        assert_relative_eq!(
            camera_distance_from_angle(-PI / 6.0).unwrap(),
            2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn zero_and_pi_are_degenerate() {
        for angle in [0.0, PI, f64::NAN] {
            assert!(matches!(
                camera_distance_from_angle(angle),
                Err(GeometryError::DegenerateAngle { .. })
            ));
        }
    }

    #[test]
    fn new_camera_sits_on_negative_y() {
        let mut cam = CameraPosition::new(2.0, Point2::new(320.0, 240.0)).unwrap();
        let p = cam.world_position();
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, -2.0, epsilon = 1e-12);

        cam.angle_estimate = FRAC_PI_4;
        let p = cam.world_position();
        let h = 2.0 * FRAC_PI_4.sin();
        assert_relative_eq!(p.x, h, epsilon = 1e-12);
        assert_relative_eq!(p.y, -h, epsilon = 1e-12);
    }

    #[test]
    fn cartesian_round_trip_and_axis_rejection() {
        let cam =
            CameraPosition::from_cartesian(Vector3::new(0.0, -3.0, 4.0), Point2::origin()).unwrap();
        assert_relative_eq!(cam.distance(), 5.0);
        assert_relative_eq!(cam.ground_distance(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(cam.cartesian(), Vector3::new(0.0, -3.0, 4.0), epsilon = 1e-12);

        assert!(matches!(
            CameraPosition::from_cartesian(Vector3::new(0.0, 0.0, 1.0), Point2::origin()),
            Err(GeometryError::OnTreeAxis)
        ));
        assert!(CameraPosition::new(0.0, Point2::origin()).is_err());
        let mut cam = CameraPosition::new(1.0, Point2::origin()).unwrap();
        assert!(cam.set_distance(-1.0).is_err());
        assert_relative_eq!(cam.distance(), 1.0);
    }
}
