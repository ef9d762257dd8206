//! 压缩 tar 归档：列清单与就地展开
use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tar::Archive;

/// 支持的归档格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGzip,
    TarBzip2,
}

impl ArchiveFormat {
    fn decoder(self, file: File) -> Box<dyn Read> {
        match self {
            ArchiveFormat::TarGzip => Box::new(MultiGzDecoder::new(file)),
            ArchiveFormat::TarBzip2 => Box::new(MultiBzDecoder::new(file)),
        }
    }
}

/// 归档清单
#[derive(Debug, Default)]
pub(crate) struct ArchiveListing {
    /// 非目录成员的相对路径，按归档内顺序，去重
    pub(crate) members: Vec<PathBuf>,
    /// 头部声明的成员总大小
    pub(crate) total_size: u64,
}

/// 完整读一遍归档并列出成员
///
/// 任何解压或头部错误都会在这里暴露，此时磁盘上尚未写入任何内容。
pub(crate) fn list_members(file: File, format: ArchiveFormat) -> io::Result<ArchiveListing> {
    let mut archive = Archive::new(format.decoder(file));
    let mut listing = ArchiveListing::default();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut entries_total = 0usize;

    for entry in archive.entries()? {
        let entry = entry?;
        entries_total += 1;
        listing.total_size = listing.total_size.saturating_add(entry.size());
        if entry.header().entry_type().is_dir() {
            continue;
        }
        // 含 `..` 的成员不会被展开
        let Some(rel) = member_path(&entry.path()?) else { continue };
        if seen.insert(rel.clone()) {
            listing.members.push(rel);
        }
    }

    if entries_total == 0 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "empty archive"));
    }
    Ok(listing)
}

/// 将归档展开到 `dest`
pub(crate) fn extract(path: &Path, format: ArchiveFormat, dest: &Path) -> io::Result<()> {
    Archive::new(format.decoder(File::open(path)?)).unpack(dest)
}

/// 归一化成员路径：去掉 `/` 与 `.`，遇到 `..` 则放弃
fn member_path(raw: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for c in raw.components() {
        match c {
            Component::Normal(p) => out.push(p),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => return None,
        }
    }
    if out.as_os_str().is_empty() { None } else { Some(out) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let enc = GzEncoder::new(Vec::new(), flate2::Compression::default());
        let mut builder = tar::Builder::new(enc);
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn lists_members_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src.tar.gz");
        std::fs::write(&path, tar_gz(&[("pkg/b.txt", b"bb"), ("pkg/a.txt", b"a")])).unwrap();

        let listing = list_members(File::open(&path).unwrap(), ArchiveFormat::TarGzip).unwrap();
        assert_eq!(listing.members, vec![PathBuf::from("pkg/b.txt"), PathBuf::from("pkg/a.txt")]);
        assert_eq!(listing.total_size, 3);
    }

    #[test]
    fn gzip_without_tar_inside_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.gz");
        let mut enc = GzEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(b"just some compressed prose, nothing tar shaped here\n").unwrap();
        std::fs::write(&path, enc.finish().unwrap()).unwrap();

        assert!(list_members(File::open(&path).unwrap(), ArchiveFormat::TarGzip).is_err());
    }

    #[test]
    fn truncated_gzip_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cut.tar.gz");
        // 伪随机内容，压缩后截断点必然落在成员数据中间
        let mut state = 0x2545_f491_u32;
        let noise: Vec<u8> = (0..65536)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            })
            .collect();
        let bytes = tar_gz(&[("a.bin", noise.as_slice())]);
        std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        assert!(list_members(File::open(&path).unwrap(), ArchiveFormat::TarGzip).is_err());
    }

    #[test]
    fn extract_writes_members_next_to_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src.tar.gz");
        std::fs::write(&path, tar_gz(&[("pkg/a.txt", b"hello")])).unwrap();

        extract(&path, ArchiveFormat::TarGzip, dir.path()).unwrap();
        assert_eq!(std::fs::read(dir.path().join("pkg/a.txt")).unwrap(), b"hello");
    }

    #[test]
    fn member_path_normalisation() {
        assert_eq!(member_path(Path::new("./pkg/a.c")), Some(PathBuf::from("pkg/a.c")));
        assert_eq!(member_path(Path::new("/abs/a.c")), Some(PathBuf::from("abs/a.c")));
        assert_eq!(member_path(Path::new("pkg/../../evil")), None);
        assert_eq!(member_path(Path::new("./")), None);
    }
}
