use crate::engine::Vec3;

/// radians per fixed update while a rotate key is held
const ROTATION_SPEED: f32 = 0.03;

/// Which rotate keys are held this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CubeSpin {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl CubeSpin {
    pub fn is_idle(&self) -> bool {
        !(self.up || self.down || self.left || self.right)
    }
}

// face normals in cube space and the digit printed on that face's color
//   +x green, -x purple, +y yellow, -y blue, +z orange, -z red
const FACES: [(Vec3, u8); 6] = [
    (Vec3::new(1.0, 0.0, 0.0), 5),
    (Vec3::new(-1.0, 0.0, 0.0), 6),
    (Vec3::new(0.0, 1.0, 0.0), 2),
    (Vec3::new(0.0, -1.0, 0.0), 4),
    (Vec3::new(0.0, 0.0, 1.0), 1),
    (Vec3::new(0.0, 0.0, -1.0), 3),
];

/// Euler rotation of the color cube (x then y, same order the scene uses).
/// Turning the cube is how the player picks a digit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CubeOrientation {
    pub pitch: f32,
    pub yaw: f32,
}

impl CubeOrientation {
    /// returns whether anything turned
    pub fn rotate(&mut self, spin: CubeSpin) -> bool {
        if spin.up {
            self.pitch -= ROTATION_SPEED;
        }
        if spin.down {
            self.pitch += ROTATION_SPEED;
        }
        if spin.left {
            self.yaw -= ROTATION_SPEED;
        }
        if spin.right {
            self.yaw += ROTATION_SPEED;
        }
        !spin.is_idle()
    }

    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.pitch, self.yaw, 0.0)
    }

    /// Digit of the face pointing most directly at the viewer (+z). Ties go to
    /// the earlier face in the table.
    pub fn facing_digit(&self) -> u8 {
        let mut best = FACES[0].1;
        let mut best_dot = f32::NEG_INFINITY;
        for (normal, digit) in FACES {
            let dot = self.toward_viewer(normal);
            if dot > best_dot {
                best_dot = dot;
                best = digit;
            }
        }
        best
    }

    /// z component of R_x(pitch) * R_y(yaw) * v
    fn toward_viewer(&self, v: Vec3) -> f32 {
        let (sin_p, cos_p) = self.pitch.sin_cos();
        let (sin_y, cos_y) = self.yaw.sin_cos();
        let z_after_yaw = -v.x * sin_y + v.z * cos_y;
        v.y * sin_p + z_after_yaw * cos_p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn resting_cube_shows_orange_front() {
        assert_eq!(CubeOrientation::default().facing_digit(), 1);
    }

    #[test]
    fn quarter_yaw_shows_purple_left_face() {
        let cube = CubeOrientation {
            pitch: 0.0,
            yaw: FRAC_PI_2,
        };
        assert_eq!(cube.facing_digit(), 6);
    }

    #[test]
    fn quarter_pitch_shows_yellow_top() {
        let cube = CubeOrientation {
            pitch: FRAC_PI_2,
            yaw: 0.0,
        };
        assert_eq!(cube.facing_digit(), 2);
    }

    #[test]
    fn half_turn_shows_red_back() {
        let cube = CubeOrientation {
            pitch: 0.0,
            yaw: std::f32::consts::PI,
        };
        assert_eq!(cube.facing_digit(), 3);
    }

    #[test]
    fn held_keys_turn_the_cube() {
        let mut cube = CubeOrientation::default();
        assert!(!cube.rotate(CubeSpin::default()));
        assert!(cube.rotate(CubeSpin {
            up: true,
            right: true,
            ..CubeSpin::default()
        }));
        approx::assert_relative_eq!(cube.pitch, -ROTATION_SPEED);
        approx::assert_relative_eq!(cube.yaw, ROTATION_SPEED);
    }
}
