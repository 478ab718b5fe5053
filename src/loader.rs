use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HtFile {
    GraphicsDict,
    GraphicsHead,
    GraphicsData,
    Level(usize),
}

pub fn file_name(file: HtFile) -> String {
    match file {
        HtFile::GraphicsDict => "EGADICT.HOV".to_string(),
        HtFile::GraphicsHead => "EGAHEAD.HOV".to_string(),
        HtFile::GraphicsData => "EGAGRAPH.HOV".to_string(),
        HtFile::Level(n) => format!("LEVEL{:02}.HOV", n + 1),
    }
}

pub trait Loader {
    fn load_file(&self, file: HtFile) -> Result<Vec<u8>, String>;
}

pub struct DiskLoader {
    pub data_path: PathBuf,
}

impl Loader for DiskLoader {
    fn load_file(&self, file: HtFile) -> Result<Vec<u8>, String> {
        let name = file_name(file);
        load_file(&self.data_path.join(&name))
            .map_err(|e| format!("loading {} failed: {}", name, e))
    }
}

fn load_file(path: &Path) -> Result<Vec<u8>, std::io::Error> {
    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    Ok(data)
}
