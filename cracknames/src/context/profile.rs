use config::{Config, File, FileFormat};
use std::env;

const DEFAULT_PROFILE_PATH: &str = "/etc/cracknames.conf";
const PROFILE_ENV: &str = "CRACKNAMES_CONFIG";

#[derive(Debug, Default)]
pub struct Profile {
    files: Vec<ProfileFile>,
}

macro_rules! get_value {
    ($fn:ident, $type:ident) => {
        pub fn $fn(&self, key: &str) -> Option<$type> {
            for file in &self.files {
                if let Ok(value) = file.config.$fn(key) {
                    return Some(value);
                }
            }
            None
        }
    };
}

impl Profile {
    /// Loads the files named by `CRACKNAMES_CONFIG`, or the system default.
    /// An explicit list must exist; the system default may be absent.
    pub fn new() -> anyhow::Result<Self> {
        match env::var(PROFILE_ENV) {
            Ok(files) => {
                let files: Vec<String> = files.split(':').map(|f| f.to_owned()).collect();
                Self::from_files(&files)
            }
            Err(_) => Self::from_optional_file(DEFAULT_PROFILE_PATH),
        }
    }

    pub fn from_files(files: &[String]) -> anyhow::Result<Self> {
        let mut profile_files = vec![];
        for file in files {
            profile_files.push(ProfileFile::new(file, true)?);
        }
        Ok(Self {
            files: profile_files,
        })
    }

    fn from_optional_file(filename: &str) -> anyhow::Result<Self> {
        Ok(Self {
            files: vec![ProfileFile::new(filename, false)?],
        })
    }

    get_value!(get_string, String);

    get_value!(get_int, i64);
}

#[derive(Debug)]
struct ProfileFile {
    config: Config,
}

impl ProfileFile {
    fn new(filename: &str, required: bool) -> anyhow::Result<Self> {
        let expanded_filename = match (filename.starts_with("~/"), env::var("HOME")) {
            (true, Ok(home_env)) => format!("{}{}", home_env, &filename[1..]),
            _ => filename.to_owned(),
        };
        let config = Config::builder()
            .add_source(
                File::with_name(&expanded_filename)
                    .format(FileFormat::Ini)
                    .required(required),
            )
            .build()?;
        Ok(Self { config })
    }
}
