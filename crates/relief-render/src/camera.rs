//! Camera models: primary ray generation per pixel.
//!
//! The projection set is fixed and known at design time, so it is a
//! closed enum with exhaustive case handling rather than a trait
//! object. All variants share one orthonormal-basis pose.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use relief_core::{Ray, RenderError};

/// Camera pose: position and orientation in world space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: DVec3,
    pub look_at: DVec3,
    /// World-space up hint used to build the camera basis. For
    /// top-down cartographic views, +y (North) keeps north up on the
    /// image.
    pub up: DVec3,
}

impl CameraPose {
    pub fn new(position: DVec3, look_at: DVec3) -> Self {
        Self {
            position,
            look_at,
            up: DVec3::Y,
        }
    }
}

/// Projection variant with its geometric parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Projection {
    /// Pinhole perspective with a vertical field of view (radians).
    Perspective { fov: f64 },
    /// Parallel rays; `half_extent` is half the view plane's world
    /// height.
    Orthographic { half_extent: f64 },
    /// Orthographic base with an elevation-proportional vertical
    /// shear: a plan view where relief leans by `tilt` (radians),
    /// scaled by the vertical `exaggeration` factor.
    PlanOblique {
        half_extent: f64,
        tilt: f64,
        exaggeration: f64,
    },
}

/// A fully validated camera ready to generate primary rays.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    width: usize,
    height: usize,
    position: DVec3,
    projection: Projection,
    // Orthonormal basis: u right, v up, w backward (toward viewer).
    u: DVec3,
    v: DVec3,
    w: DVec3,
    aspect_x: f64,
    aspect_y: f64,
}

impl Camera {
    /// Build a camera; structural parameter faults are fatal here,
    /// before any render work starts.
    pub fn new(
        width: usize,
        height: usize,
        pose: CameraPose,
        projection: Projection,
    ) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidCamera(format!(
                "image dimensions must be positive, got {width}x{height}"
            )));
        }
        match projection {
            Projection::Perspective { fov } => {
                if !(fov > 0.0 && fov < std::f64::consts::PI) {
                    return Err(RenderError::InvalidCamera(format!(
                        "field of view must be in (0, pi), got {fov}"
                    )));
                }
            }
            Projection::Orthographic { half_extent } => {
                if !(half_extent > 0.0) {
                    return Err(RenderError::InvalidCamera(format!(
                        "orthographic half extent must be positive, got {half_extent}"
                    )));
                }
            }
            Projection::PlanOblique {
                half_extent, tilt, ..
            } => {
                if !(half_extent > 0.0) {
                    return Err(RenderError::InvalidCamera(format!(
                        "plan-oblique half extent must be positive, got {half_extent}"
                    )));
                }
                if !(tilt > 0.0 && tilt < std::f64::consts::FRAC_PI_2) {
                    return Err(RenderError::InvalidCamera(format!(
                        "plan-oblique tilt must be in (0, pi/2), got {tilt}"
                    )));
                }
            }
        }

        let forward = pose.look_at - pose.position;
        if forward.length_squared() == 0.0 {
            return Err(RenderError::InvalidCamera(
                "camera position and look-at coincide".into(),
            ));
        }
        let w = -forward.normalize();
        let right = pose.up.cross(w);
        if right.length_squared() < 1e-24 {
            return Err(RenderError::InvalidCamera(
                "up vector is parallel to the view direction".into(),
            ));
        }
        let u = right.normalize();
        let v = w.cross(u);

        // Wider images widen the horizontal extent, taller images the
        // vertical one.
        let (aspect_x, aspect_y) = if width > height {
            (width as f64 / height as f64, 1.0)
        } else {
            (1.0, height as f64 / width as f64)
        };

        Ok(Self {
            width,
            height,
            position: pose.position,
            projection,
            u,
            v,
            w,
            aspect_x,
            aspect_y,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Primary ray through fractional pixel coordinates (the
    /// sub-pixel sample offset is already folded into x and y).
    /// Pixel (0, 0) is the image's upper-left corner.
    pub fn cast_ray(&self, x: f64, y: f64) -> Ray {
        // Raster to normalized device coordinates in [-1, 1].
        let px = (x / self.width as f64 * 2.0 - 1.0) * self.aspect_x;
        let py = (1.0 - y / self.height as f64 * 2.0) * self.aspect_y;

        match self.projection {
            Projection::Perspective { fov } => {
                let plane = (fov * 0.5).tan();
                let dir = self.u * (px * plane) + self.v * (py * plane) - self.w;
                Ray::new(self.position, dir.normalize())
            }
            Projection::Orthographic { half_extent } => {
                let offset = self.u * (px * half_extent) + self.v * (py * half_extent);
                Ray::new(self.position + offset, -self.w)
            }
            Projection::PlanOblique {
                half_extent,
                tilt,
                exaggeration,
            } => {
                // Orthographic base ray, then the inverse of the
                // plan-oblique shear (screen = world + v * s * z)
                // applied to origin and direction.
                let offset = self.u * (px * half_extent) + self.v * (py * half_extent);
                let origin = self.position + offset;
                let dir = -self.w;
                let s = exaggeration * tilt.tan();
                let sheared_origin = origin - self.v * (s * origin.z);
                let sheared_dir = (dir - self.v * (s * dir.z)).normalize();
                Ray::new(sheared_origin, sheared_dir)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn top_down_pose() -> CameraPose {
        CameraPose::new(DVec3::new(5.0, 5.0, 100.0), DVec3::new(5.0, 5.0, 0.0))
    }

    #[test]
    fn test_invalid_camera_parameters() {
        let pose = top_down_pose();
        assert!(Camera::new(100, 100, pose, Projection::Perspective { fov: 0.0 }).is_err());
        assert!(Camera::new(100, 100, pose, Projection::Perspective { fov: 4.0 }).is_err());
        assert!(Camera::new(100, 100, pose, Projection::Orthographic { half_extent: -1.0 }).is_err());
        assert!(Camera::new(0, 100, pose, Projection::Orthographic { half_extent: 1.0 }).is_err());
        assert!(Camera::new(
            100,
            100,
            pose,
            Projection::PlanOblique {
                half_extent: 10.0,
                tilt: 2.0,
                exaggeration: 1.0
            }
        )
        .is_err());

        let degenerate = CameraPose {
            up: DVec3::Z,
            ..top_down_pose()
        };
        assert!(
            Camera::new(100, 100, degenerate, Projection::Perspective { fov: 0.5 }).is_err(),
            "up parallel to view direction must be rejected"
        );
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let pose = CameraPose::new(DVec3::new(10.0, -20.0, 30.0), DVec3::new(-5.0, 8.0, 0.0));
        let cam = Camera::new(640, 480, pose, Projection::Perspective { fov: 0.9 }).unwrap();
        assert_relative_eq!(cam.u.dot(cam.v), 0.0, epsilon = 1e-12);
        assert_relative_eq!(cam.u.dot(cam.w), 0.0, epsilon = 1e-12);
        assert_relative_eq!(cam.v.dot(cam.w), 0.0, epsilon = 1e-12);
        assert_relative_eq!(cam.u.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(cam.v.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(cam.w.length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_perspective_center_ray_points_forward() {
        let cam = Camera::new(
            101,
            101,
            top_down_pose(),
            Projection::Perspective { fov: 0.2 },
        )
        .unwrap();
        let ray = cam.cast_ray(50.5, 50.5);
        assert_eq!(ray.origin, DVec3::new(5.0, 5.0, 100.0));
        assert_relative_eq!(ray.direction.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(ray.direction.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(ray.direction.z, -1.0, epsilon = 1e-12);
    }

    /// Orthographic parallel-ray scenario: pixels Δx apart produce
    /// origins exactly Δx apart in world space with identical
    /// directions.
    #[test]
    fn test_orthographic_parallel_rays() {
        // 100px image over a 100m view plane: 1 pixel = 1 meter.
        let cam = Camera::new(
            100,
            100,
            top_down_pose(),
            Projection::Orthographic { half_extent: 50.0 },
        )
        .unwrap();
        let a = cam.cast_ray(10.0, 40.0);
        let b = cam.cast_ray(27.0, 40.0);
        assert_eq!(a.direction, b.direction, "orthographic rays are parallel");
        let delta = b.origin - a.origin;
        assert_relative_eq!(delta.length(), 17.0, epsilon = 1e-9);
        assert_relative_eq!(delta.x, 17.0, epsilon = 1e-9);
        assert_relative_eq!(delta.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_plan_oblique_shears_direction() {
        let tilt = std::f64::consts::FRAC_PI_4;
        let cam = Camera::new(
            100,
            100,
            top_down_pose(),
            Projection::PlanOblique {
                half_extent: 50.0,
                tilt,
                exaggeration: 1.0,
            },
        )
        .unwrap();
        let ray = cam.cast_ray(50.0, 50.0);
        // tan(pi/4) = 1: the ray leans one meter north per meter of
        // descent so higher terrain renders displaced on screen.
        let expected = DVec3::new(0.0, 1.0, -1.0).normalize();
        assert_relative_eq!(ray.direction.x, expected.x, epsilon = 1e-12);
        assert_relative_eq!(ray.direction.y, expected.y, epsilon = 1e-12);
        assert_relative_eq!(ray.direction.z, expected.z, epsilon = 1e-12);
        // Origin is sheared back by the camera height.
        assert_relative_eq!(ray.origin.y, 5.0 - 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_plan_oblique_zero_exaggeration_is_orthographic() {
        let ortho = Camera::new(
            100,
            100,
            top_down_pose(),
            Projection::Orthographic { half_extent: 50.0 },
        )
        .unwrap();
        let oblique = Camera::new(
            100,
            100,
            top_down_pose(),
            Projection::PlanOblique {
                half_extent: 50.0,
                tilt: 0.5,
                exaggeration: 0.0,
            },
        )
        .unwrap();
        let a = ortho.cast_ray(30.0, 70.0);
        let b = oblique.cast_ray(30.0, 70.0);
        assert_eq!(a.origin, b.origin);
        assert_eq!(a.direction, b.direction);
    }
}
