//! Compound value types and their readers
//!
//! These are the small fixed-layout structures that chunk payloads are built from:
//! vectors, colours, packed transforms and external file references.

use std::f32::consts::PI;

use serde::Serialize;

use crate::cursor::Cursor;
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Integer pair (stored as two `u32`s; signedness depends on the field)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Int2 {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Int3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Int3 {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Int4 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub w: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// 3x3 rotation plus translation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Iso4 {
    pub xx: f32,
    pub xy: f32,
    pub xz: f32,
    pub yx: f32,
    pub yy: f32,
    pub yz: f32,
    pub zx: f32,
    pub zy: f32,
    pub zz: f32,
    pub tx: f32,
    pub ty: f32,
    pub tz: f32,
}

/// Vehicle state decoded from the packed sample layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub speed: f32,
    pub velocity: Vec3,
}

/// Reference to an external file (skin pack, music, image)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileRef {
    pub version: u8,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locator_url: Option<String>,
}

impl Cursor<'_> {
    pub fn read_vec2(&mut self) -> Result<Vec2> {
        Ok(Vec2 {
            x: self.read_f32()?,
            y: self.read_f32()?,
        })
    }

    pub fn read_vec3(&mut self) -> Result<Vec3> {
        Ok(Vec3 {
            x: self.read_f32()?,
            y: self.read_f32()?,
            z: self.read_f32()?,
        })
    }

    pub fn read_int2(&mut self) -> Result<Int2> {
        Ok(Int2 {
            x: self.read_i32()?,
            y: self.read_i32()?,
        })
    }

    pub fn read_int3(&mut self) -> Result<Int3> {
        Ok(Int3 {
            x: self.read_i32()?,
            y: self.read_i32()?,
            z: self.read_i32()?,
        })
    }

    pub fn read_int4(&mut self) -> Result<Int4> {
        Ok(Int4 {
            x: self.read_i32()?,
            y: self.read_i32()?,
            z: self.read_i32()?,
            w: self.read_i32()?,
        })
    }

    /// Three unsigned bytes widened to an [`Int3`]
    pub fn read_byte3(&mut self) -> Result<Int3> {
        Ok(Int3 {
            x: self.read_u8()? as i32,
            y: self.read_u8()? as i32,
            z: self.read_u8()? as i32,
        })
    }

    pub fn read_quat(&mut self) -> Result<Quat> {
        Ok(Quat {
            x: self.read_f32()?,
            y: self.read_f32()?,
            z: self.read_f32()?,
            w: self.read_f32()?,
        })
    }

    pub fn read_color(&mut self) -> Result<Color> {
        Ok(Color {
            r: self.read_f32()?,
            g: self.read_f32()?,
            b: self.read_f32()?,
        })
    }

    pub fn read_iso4(&mut self) -> Result<Iso4> {
        let mut m = [0f32; 12];
        for v in &mut m {
            *v = self.read_f32()?;
        }
        let [xx, xy, xz, yx, yy, yz, zx, zy, zz, tx, ty, tz] = m;
        Ok(Iso4 {
            xx,
            xy,
            xz,
            yx,
            yy,
            yz,
            zx,
            zy,
            zz,
            tx,
            ty,
            tz,
        })
    }

    /// Read the packed 22-byte vehicle transform.
    ///
    /// Layout: position (3 x f32), rotation angle (u16), axis heading (i16),
    /// axis pitch (i16), log speed (i16), velocity heading (u8), velocity pitch (u8).
    pub fn read_transform(&mut self) -> Result<Transform> {
        let position = self.read_vec3()?;

        let angle = self.read_u16()? as f32 / 65535.0 * PI;
        let axis_heading = self.read_i16()? as f32 / 32767.0 * PI;
        let axis_pitch = self.read_i16()? as f32 / 32767.0 * PI / 2.0;

        let speed = (self.read_i16()? as f32 / 1000.0).exp();
        let velocity_heading = (self.read_u8()? as f32 - 128.0) / 127.0 * PI;
        let velocity_pitch = (self.read_u8()? as f32 - 128.0) / 127.0 * PI / 2.0;

        let (sin_angle, cos_angle) = angle.sin_cos();
        let rotation = Quat {
            x: sin_angle * axis_pitch.cos() * axis_heading.cos(),
            y: sin_angle * axis_pitch.cos() * axis_heading.sin(),
            z: sin_angle * axis_pitch.sin(),
            w: cos_angle,
        };

        let velocity = Vec3 {
            x: speed * velocity_pitch.cos() * velocity_heading.cos(),
            y: speed * velocity_pitch.cos() * velocity_heading.sin(),
            z: speed * velocity_pitch.sin(),
        };

        Ok(Transform {
            position,
            rotation,
            speed,
            velocity,
        })
    }

    pub fn read_file_ref(&mut self) -> Result<FileRef> {
        let version = self.read_u8()?;

        let checksum = if version >= 3 {
            Some(self.read_bytes(32)?.to_vec())
        } else {
            None
        };

        let file_path = self.read_string()?;

        let locator_url = if (!file_path.is_empty() && version >= 1) || version >= 3 {
            Some(self.read_string()?)
        } else {
            None
        };

        Ok(FileRef {
            version,
            file_path,
            checksum,
            locator_url,
        })
    }

    /// Integer whose width depends on an upper bound known to the reader.
    pub fn read_optimized_int(&mut self, bound: u32) -> Result<i32> {
        if bound >= 65535 {
            self.read_i32()
        } else if bound >= 255 {
            Ok(self.read_u16()? as i32)
        } else {
            Ok(self.read_u8()? as i32)
        }
    }

    /// `len` integers, all with the width chosen from `bound` (or `len` itself).
    pub fn read_optimized_int_array(&mut self, len: usize, bound: Option<u32>) -> Result<Vec<i32>> {
        let bound = bound.unwrap_or(len as u32);
        let mut out = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            out.push(self.read_optimized_int(bound)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform_bytes(angle: u16, heading: i16, pitch: i16, speed: i16, vh: u8, vp: u8) -> Vec<u8> {
        let mut data = Vec::new();
        for v in [1.0f32, 2.0, 3.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&angle.to_le_bytes());
        data.extend_from_slice(&heading.to_le_bytes());
        data.extend_from_slice(&pitch.to_le_bytes());
        data.extend_from_slice(&speed.to_le_bytes());
        data.push(vh);
        data.push(vp);
        data
    }

    #[test]
    fn test_transform_identity_rotation() {
        let data = transform_bytes(0, 0, 0, 0, 128, 128);
        let t = Cursor::new(&data).read_transform().unwrap();
        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.rotation.w, 1.0);
        assert_eq!(t.rotation.x, 0.0);
        // exp(0) = 1, heading and pitch both zero
        assert!((t.speed - 1.0).abs() < 1e-6);
        assert!((t.velocity.x - 1.0).abs() < 1e-6);
        assert!(t.velocity.y.abs() < 1e-6);
        assert!(t.velocity.z.abs() < 1e-6);
    }

    #[test]
    fn test_transform_half_turn_about_z() {
        // angle = pi / 2 gives a 180 degree rotation; pitch = pi / 2 points the axis up
        let data = transform_bytes(32768, 0, 32767, 1000, 128, 128);
        let t = Cursor::new(&data).read_transform().unwrap();
        assert!(t.rotation.w.abs() < 1e-3);
        assert!((t.rotation.z - 1.0).abs() < 1e-3);
        assert!((t.speed - std::f32::consts::E).abs() < 1e-4);
    }

    #[test]
    fn test_file_ref_versions() {
        // version 0 with a path: no locator url
        let mut data = vec![0u8];
        data.extend_from_slice(&3i32.to_le_bytes());
        data.extend_from_slice(b"a.x");
        let r = Cursor::new(&data).read_file_ref().unwrap();
        assert_eq!(r.file_path, "a.x");
        assert!(r.locator_url.is_none());

        // version 3 always has a checksum and a locator url
        let mut data = vec![3u8];
        data.extend_from_slice(&[0xAB; 32]);
        data.extend_from_slice(&0i32.to_le_bytes());
        data.extend_from_slice(&4i32.to_le_bytes());
        data.extend_from_slice(b"http");
        let r = Cursor::new(&data).read_file_ref().unwrap();
        assert_eq!(r.checksum.as_deref().map(<[u8]>::len), Some(32));
        assert_eq!(r.locator_url.as_deref(), Some("http"));
    }

    #[test]
    fn test_optimized_int_width() {
        let data = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(Cursor::new(&data).read_optimized_int(10).unwrap(), 1);
        assert_eq!(Cursor::new(&data).read_optimized_int(300).unwrap(), 0x0201);
        assert_eq!(
            Cursor::new(&data).read_optimized_int(70000).unwrap(),
            0x0403_0201
        );

        let values = Cursor::new(&data)
            .read_optimized_int_array(2, Some(1000))
            .unwrap();
        assert_eq!(values, vec![0x0201, 0x0403]);
    }
}
