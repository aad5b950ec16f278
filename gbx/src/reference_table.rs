//! External reference table
//!
//! Lists files outside the GBX that body nodes may point at, together with the
//! folder tree they live in.

use serde::Serialize;

use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// Folder trees deeper than this are treated as corrupt
const MAX_FOLDER_DEPTH: u32 = 64;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferenceTable {
    pub ancestor_level: u32,
    pub folders: Vec<Folder>,
    pub files: Vec<ExternalFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Folder {
    pub name: String,
    pub sub_folders: Vec<Folder>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExternalFile {
    pub flags: u32,
    /// Inline path, present when bit 2 of `flags` is clear
    pub file_name: Option<String>,
    /// Resource index, present when bit 2 of `flags` is set
    pub resource_index: Option<u32>,
    pub node_index: u32,
    pub use_file: u32,
    pub folder_index: Option<u32>,
}

impl ExternalFile {
    fn has_inline_path(flags: u32) -> bool {
        flags & 4 == 0
    }
}

/// Read the reference table; `None` when the file count is zero.
pub fn read_reference_table(cursor: &mut Cursor<'_>) -> Result<Option<ReferenceTable>> {
    let num_files = cursor.read_u32()?;
    if num_files == 0 {
        return Ok(None);
    }

    let ancestor_level = cursor.read_u32()?;
    let num_folders = cursor.read_u32()?;
    let mut folders = Vec::new();
    for _ in 0..num_folders {
        folders.push(read_folder(cursor, 0)?);
    }

    let mut files = Vec::new();
    for _ in 0..num_files {
        let flags = cursor.read_u32()?;
        let inline = ExternalFile::has_inline_path(flags);

        let (file_name, resource_index) = if inline {
            (Some(cursor.read_string()?), None)
        } else {
            (None, Some(cursor.read_u32()?))
        };

        let node_index = cursor.read_u32()?;
        let use_file = cursor.read_u32()?;
        let folder_index = if inline {
            Some(cursor.read_u32()?)
        } else {
            None
        };

        files.push(ExternalFile {
            flags,
            file_name,
            resource_index,
            node_index,
            use_file,
            folder_index,
        });
    }

    tracing::debug!(
        files = files.len(),
        folders = folders.len(),
        "read reference table"
    );

    Ok(Some(ReferenceTable {
        ancestor_level,
        folders,
        files,
    }))
}

fn read_folder(cursor: &mut Cursor<'_>, depth: u32) -> Result<Folder> {
    if depth >= MAX_FOLDER_DEPTH {
        return Err(Error::NestingTooDeep {
            limit: MAX_FOLDER_DEPTH,
            offset: cursor.position(),
        });
    }

    let name = cursor.read_string()?;
    let count = cursor.read_u32()?;
    let mut sub_folders = Vec::new();
    for _ in 0..count {
        sub_folders.push(read_folder(cursor, depth + 1)?);
    }

    Ok(Folder { name, sub_folders })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_u32(data: &mut Vec<u8>, v: u32) {
        data.extend_from_slice(&v.to_le_bytes());
    }

    fn push_str(data: &mut Vec<u8>, s: &str) {
        data.extend_from_slice(&(s.len() as i32).to_le_bytes());
        data.extend_from_slice(s.as_bytes());
    }

    #[test]
    fn test_empty_table() {
        let data = 0u32.to_le_bytes();
        let mut c = Cursor::new(&data);
        assert_eq!(read_reference_table(&mut c).unwrap(), None);
        assert_eq!(c.position(), 4);
    }

    #[test]
    fn test_folders_and_files() {
        let mut data = Vec::new();
        push_u32(&mut data, 2); // files
        push_u32(&mut data, 1); // ancestor level
        push_u32(&mut data, 1); // folders
        push_str(&mut data, "Skins");
        push_u32(&mut data, 1);
        push_str(&mut data, "Vehicles");
        push_u32(&mut data, 0);

        // inline path
        push_u32(&mut data, 0);
        push_str(&mut data, "car.zip");
        push_u32(&mut data, 3);
        push_u32(&mut data, 1);
        push_u32(&mut data, 2);

        // resource index
        push_u32(&mut data, 4);
        push_u32(&mut data, 77);
        push_u32(&mut data, 5);
        push_u32(&mut data, 0);

        let mut c = Cursor::new(&data);
        let table = read_reference_table(&mut c).unwrap().unwrap();
        assert!(c.is_empty());

        assert_eq!(table.ancestor_level, 1);
        assert_eq!(table.folders[0].name, "Skins");
        assert_eq!(table.folders[0].sub_folders[0].name, "Vehicles");

        assert_eq!(table.files[0].file_name.as_deref(), Some("car.zip"));
        assert_eq!(table.files[0].folder_index, Some(2));
        assert_eq!(table.files[0].node_index, 3);

        assert_eq!(table.files[1].resource_index, Some(77));
        assert_eq!(table.files[1].file_name, None);
        assert_eq!(table.files[1].folder_index, None);
    }
}
