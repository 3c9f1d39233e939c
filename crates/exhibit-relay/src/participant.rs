//! Presence record for one live connection.

use exhibit_common::{Color, ParticipantId};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Position in the shared space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
}

/// Orientation as sent by the producing client. Stored and forwarded in
/// object form; positional `[x, y, z, w]` / `[x, y, z]` input is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Rotation {
    Quaternion { x: f64, y: f64, z: f64, w: f64 },
    Euler { x: f64, y: f64, z: f64 },
}

/// Every accepted input shape, tried in order.
#[derive(Deserialize)]
#[serde(untagged)]
enum RotationInput {
    Quaternion { x: f64, y: f64, z: f64, w: f64 },
    Euler { x: f64, y: f64, z: f64 },
    QuaternionArray([f64; 4]),
    EulerArray([f64; 3]),
}

impl From<RotationInput> for Rotation {
    fn from(input: RotationInput) -> Self {
        match input {
            RotationInput::Quaternion { x, y, z, w }
            | RotationInput::QuaternionArray([x, y, z, w]) => Rotation::Quaternion { x, y, z, w },
            RotationInput::Euler { x, y, z } | RotationInput::EulerArray([x, y, z]) => {
                Rotation::Euler { x, y, z }
            }
        }
    }
}

impl<'de> Deserialize<'de> for Rotation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RotationInput::deserialize(deserializer).map(Rotation::from)
    }
}

impl Rotation {
    pub const IDENTITY: Rotation = Rotation::Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Rotation,
}

/// Avatar colors, fixed for the lifetime of the participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appearance {
    pub hair_color: Color,
    pub skin_color: Color,
}

impl Appearance {
    /// Two independent uniform draws over the full RGB space.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            hair_color: Color::from_u24(rng.gen_range(0..=Color::MAX_RGB)),
            skin_color: Color::from_u24(rng.gen_range(0..=Color::MAX_RGB)),
        }
    }
}

/// Snapshot shape used by `personUpdate` and `GET /api/persons`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub colors: Appearance,
    pub position: Vec3,
    pub rotation: Rotation,
}

impl Participant {
    pub fn new(id: ParticipantId) -> Self {
        Self::with_rng(id, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng>(id: ParticipantId, rng: &mut R) -> Self {
        let name = display_name(&id);
        Self {
            id,
            name,
            colors: Appearance::random(rng),
            position: Vec3::ZERO,
            rotation: Rotation::IDENTITY,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform {
            position: self.position,
            rotation: self.rotation,
        }
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.position = transform.position;
        self.rotation = transform.rotation;
    }
}

pub fn display_name(id: &ParticipantId) -> String {
    format!("User{id}")
}
