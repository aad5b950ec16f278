//! CPlugEntRecordData: recorded vehicle states of a ghost
//!
//! The payload is a zlib block holding a sequence of entity buffers. Each buffer
//! contains size-prefixed samples whose layout depends on the buffer type; vehicle
//! buffers (types 4 and 6) carry inputs, engine state and a packed transform.

use crate::chunk::ChunkEntry;
use crate::compression::{Codec, read_compressed_block};
use crate::cursor::Cursor;
use crate::error::Result;
use crate::node::{Fields, Sample};
use crate::reader::Reader;

pub const CLASS_ID: u32 = 0x0911_F000;

pub const CHUNKS: &[ChunkEntry] = &[ChunkEntry::read(0x0911_F000, read_record_data)];

/// Buffer holding only a transform
const BUFFER_TRANSFORM: i32 = 2;
/// Vehicle buffers
const BUFFER_VEHICLE: i32 = 4;
const BUFFER_VEHICLE_ALT: i32 = 6;

/// Offset of the gear byte inside a vehicle sample
const GEAR_OFFSET: usize = 91;

fn read_record_data(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_version(0x0911_F000, 10)?;
    let data = read_compressed_block(r, Codec::Zlib)?;
    let mut c = Cursor::new(&data);

    c.advance(4)?;
    let ghost_length = c.read_i32()?;

    let count = usize::try_from(c.read_i32()?).unwrap_or(0);
    let mut objects = Vec::with_capacity(count.min(c.remaining()));
    for _ in 0..count {
        let node_id = c.read_u32()?;
        c.advance(12)?;
        let mw_buffer = c.read_i32()?;
        c.advance(4)?;
        objects.push(
            Fields::new()
                .with("nodeId", node_id)
                .with("mwbuffer", mw_buffer),
        );
    }

    if version >= 2 {
        let count = usize::try_from(c.read_i32()?).unwrap_or(0);
        for _ in 0..count {
            c.advance(8)?;
            if version >= 4 {
                c.advance(4)?;
            }
        }
    }

    let mut samples = Vec::new();
    let mut more = c.read_u8()?;
    while more != 0 {
        let buffer_type = c.read_i32()?;
        c.advance(8)?;
        c.read_i32()?; // ghost length at finish
        if version >= 6 {
            c.advance(4)?;
        }

        while c.read_u8()? != 0 {
            let timestamp = c.read_i32()?;
            let buffer = c.read_prefixed_bytes()?;
            if buffer.is_empty() {
                continue;
            }
            samples.push(read_sample(buffer, buffer_type, timestamp)?);
        }

        more = c.read_u8()?;
        if version >= 2 {
            skip_entries(&mut c, 8)?;
        }
    }

    if version >= 3 {
        read_trailer(&mut c, version)?;
    }

    tracing::debug!(samples = samples.len(), version, "read record data");

    Ok(Fields::new()
        .with("version", version)
        .with("ghostLength", ghost_length)
        .with("objects", objects)
        .with("samples", samples))
}

fn read_trailer(c: &mut Cursor<'_>, version: u32) -> Result<()> {
    skip_entries(c, 8)?;

    if version == 7 {
        skip_entries(c, 4)?;
    }

    if version >= 8 {
        if c.read_i32()? == 0 {
            return Ok(());
        }
        if version == 8 {
            skip_entries(c, 4)?;
        } else {
            while c.read_u8()? != 0 {
                c.advance(4)?;
                c.read_prefixed_bytes()?;
                c.read_prefixed_bytes()?;
            }
            if version >= 10 {
                c.advance(4)?;
            }
        }
    }
    Ok(())
}

/// Skip a byte-flagged run of `(header, i32 size, payload)` entries.
fn skip_entries(c: &mut Cursor<'_>, header: usize) -> Result<()> {
    while c.read_u8()? != 0 {
        c.advance(header)?;
        c.read_prefixed_bytes()?;
    }
    Ok(())
}

fn read_sample(buffer: &[u8], buffer_type: i32, timestamp: i32) -> Result<Sample> {
    let mut c = Cursor::new(buffer);
    let mut sample = Sample {
        timestamp,
        ..Default::default()
    };

    match buffer_type {
        BUFFER_TRANSFORM => {
            c.advance(5)?;
            sample.transform = Some(c.read_transform()?);
        }
        BUFFER_VEHICLE | BUFFER_VEHICLE_ALT => {
            c.advance(5)?;
            sample.rpm = Some(c.read_u8()?);
            c.advance(8)?;
            let steer = c.read_u8()?;
            let gas = c.read_u8()?;
            c.advance(2)?;
            let brake = c.read_u8()? as f32 / 255.0;
            sample.steer = Some((steer as f32 / 255.0 - 0.5) * 2.0);
            sample.brake = Some(brake);
            sample.gas = Some(gas as f32 / 255.0 + brake);
            c.advance(28)?;
            sample.transform = Some(c.read_transform()?);
            c.seek(GEAR_OFFSET)?;
            sample.gear = Some(c.read_u8()? as f32 / 5.0);
        }
        _ => {}
    }

    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_sample_inputs() {
        let mut buffer = vec![0u8; 92];
        buffer[5] = 200; // rpm
        buffer[14] = 255; // steer full right
        buffer[15] = 51; // gas
        buffer[18] = 0; // brake
        buffer[GEAR_OFFSET] = 10;

        let sample = read_sample(&buffer, BUFFER_VEHICLE, 1500).unwrap();
        assert_eq!(sample.timestamp, 1500);
        assert_eq!(sample.rpm, Some(200));
        assert_eq!(sample.steer, Some(1.0));
        assert_eq!(sample.gas, Some(0.2));
        assert_eq!(sample.brake, Some(0.0));
        assert_eq!(sample.gear, Some(2.0));
        assert!(sample.transform.is_some());
    }

    #[test]
    fn test_unknown_buffer_type_keeps_timestamp() {
        let sample = read_sample(&[1, 2, 3], 9, 40).unwrap();
        assert_eq!(sample.timestamp, 40);
        assert!(sample.transform.is_none());
    }
}
