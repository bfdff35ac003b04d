//! Binary snapshot frames.
//!
//! A frame is a plain concatenation of entity records, one per visible entity:
//!
//! ```text
//! id:u8  x_sign:u8  |x|:u16be  y_sign:u8  |y|:u16be  facing:u8  n:u8  angle:u16be * n
//! ```
//!
//! Signs are 0 for non-negative and 1 for negative. Facing is 1 for right and 0
//! for left. Angles are quantized over the full turn, see [`encode_angle`].
//! There is no frame header; an empty frame means nothing is visible.

use std::f64::consts::{PI, TAU};

use bytes::{Buf, BufMut, TryGetError};

use crate::entity::{EntityId, Facing};

pub const MAX_COORDINATE: u32 = u16::MAX as u32;
pub const MAX_GAZE_ANGLES: usize = u8::MAX as usize;
pub const RECORD_HEADER_LEN: usize = 9;

const ANGLE_STEPS: f64 = u16::MAX as f64;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("coordinate {0} exceeds the wire range of +/-{max}", max = MAX_COORDINATE)]
    CoordinateOutOfRange(i32),
    #[error("entity {0} has {1} gaze angles, the wire limit is {max}", max = MAX_GAZE_ANGLES)]
    TooManyAngles(EntityId, usize),
    #[error("frame truncated at byte {offset}: needed {needed} more")]
    Truncated { offset: usize, needed: usize },
    #[error("invalid {field} byte {value} at offset {offset}")]
    InvalidFlag {
        field: &'static str,
        value: u8,
        offset: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub id: EntityId,
    pub x: i32,
    pub y: i32,
    pub facing: Facing,
    pub gaze_angles: Vec<f64>,
}

impl EntityRecord {
    pub fn encoded_len(&self) -> usize {
        RECORD_HEADER_LEN + 2 * self.gaze_angles.len()
    }
}

/// Maps an angle in (-PI, PI] onto 0..=65535.
pub fn encode_angle(angle: f64) -> u16 {
    let normalized = ((angle + PI) / TAU) * ANGLE_STEPS;
    normalized.round().clamp(0.0, ANGLE_STEPS) as u16
}

pub fn decode_angle(encoded: u16) -> f64 {
    (encoded as f64 / ANGLE_STEPS) * TAU - PI
}

pub fn encode_record(record: &EntityRecord, out: &mut Vec<u8>) -> Result<(), CodecError> {
    let (x_sign, x_mag) = split_coordinate(record.x)?;
    let (y_sign, y_mag) = split_coordinate(record.y)?;
    let count = u8::try_from(record.gaze_angles.len())
        .map_err(|_| CodecError::TooManyAngles(record.id, record.gaze_angles.len()))?;

    out.reserve(record.encoded_len());
    out.put_u8(record.id.get());
    out.put_u8(x_sign);
    out.put_u16(x_mag);
    out.put_u8(y_sign);
    out.put_u16(y_mag);
    out.put_u8(match record.facing {
        Facing::Right => 1,
        Facing::Left => 0,
    });
    out.put_u8(count);
    for &angle in &record.gaze_angles {
        out.put_u16(encode_angle(angle));
    }
    Ok(())
}

/// Encodes every record, failing on the first one that cannot be represented.
pub fn encode_frame(records: &[EntityRecord]) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::with_capacity(records.iter().map(EntityRecord::encoded_len).sum());
    for record in records {
        encode_record(record, &mut out)?;
    }
    Ok(out)
}

pub fn decode_frame(data: &[u8]) -> Result<Vec<EntityRecord>, CodecError> {
    let mut reader = FrameReader {
        buf: data,
        len: data.len(),
    };
    let mut records = Vec::new();
    while reader.buf.has_remaining() {
        records.push(reader.record()?);
    }
    Ok(records)
}

fn split_coordinate(value: i32) -> Result<(u8, u16), CodecError> {
    let magnitude =
        u16::try_from(value.unsigned_abs()).map_err(|_| CodecError::CoordinateOutOfRange(value))?;
    Ok((u8::from(value < 0), magnitude))
}

struct FrameReader<'a> {
    buf: &'a [u8],
    len: usize,
}

impl FrameReader<'_> {
    fn offset(&self) -> usize {
        self.len - self.buf.remaining()
    }

    fn truncated(&self, e: TryGetError) -> CodecError {
        CodecError::Truncated {
            offset: self.offset(),
            needed: e.requested - e.available,
        }
    }

    fn u8(&mut self) -> Result<u8, CodecError> {
        self.buf.try_get_u8().map_err(|e| self.truncated(e))
    }

    fn u16(&mut self) -> Result<u16, CodecError> {
        self.buf.try_get_u16().map_err(|e| self.truncated(e))
    }

    fn flag(&mut self, field: &'static str) -> Result<bool, CodecError> {
        let offset = self.offset();
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(CodecError::InvalidFlag {
                field,
                value,
                offset,
            }),
        }
    }

    fn coordinate(&mut self, field: &'static str) -> Result<i32, CodecError> {
        let negative = self.flag(field)?;
        let magnitude = i32::from(self.u16()?);
        Ok(if negative { -magnitude } else { magnitude })
    }

    fn record(&mut self) -> Result<EntityRecord, CodecError> {
        let id = EntityId(self.u8()?);
        let x = self.coordinate("x sign")?;
        let y = self.coordinate("y sign")?;
        let facing = if self.flag("facing")? {
            Facing::Right
        } else {
            Facing::Left
        };
        let count = self.u8()? as usize;
        let gaze_angles = (0..count)
            .map(|_| self.u16().map(decode_angle))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EntityRecord {
            id,
            x,
            y,
            facing,
            gaze_angles,
        })
    }
}
