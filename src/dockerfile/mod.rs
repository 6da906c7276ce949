//! Dockerfile synthesis.
//!
//! Rendering is a pure function of the package lists, the build parameters
//! and the audio group collaborator: each numbered stage is a named step
//! function returning its lines, and [`render`] assembles them in a fixed
//! order. For fixed inputs and a fixed audio GID the output is
//! byte-identical across runs.

pub mod catalog;

use crate::audio::AudioGroupLookup;
use crate::error::{ProvisionError, Result};
use crate::packages::PackageSet;
use crate::repo::repository_name;
use crate::shell::quote;

pub use catalog::SpeechModelCatalog;

/// The single locale generated inside the image.
const IMAGE_LOCALE: &str = "en_US.UTF-8";

/// User and group the assistant runs as inside the container.
const RUNTIME_USER: &str = "kalliope";

/// Fixed UID of the runtime user.
const RUNTIME_UID: u32 = 1000;

/// Where the speech_recognition library lives inside the image.
const SPEECH_RECOGNITION_LIB: &str = "/usr/local/lib/python2.7/dist-packages/speech_recognition";

/// Immutable inputs of one rendering run.
#[derive(Debug, Clone)]
pub struct BuildParams {
    /// Debian release the image is based on.
    pub debian_version: String,
    /// Timezone configured inside the image.
    pub timezone: String,
    /// Home directory shared between host and container.
    pub shared_home: String,
    /// The profile repository URL; its name becomes the working directory.
    pub profile_url: String,
    /// Locale codes whose speech models should be installed.
    pub speech_locales: Vec<String>,
}

/// Render the Dockerfile text.
///
/// Baseline apt and pip lists must be non-empty. The audio group lookup
/// happens before any line is assembled; its failure aborts rendering.
pub fn render(
    baseline: &PackageSet,
    extras: &PackageSet,
    params: &BuildParams,
    catalog: &SpeechModelCatalog,
    audio: &dyn AudioGroupLookup,
) -> Result<String> {
    if baseline.apt.is_empty() {
        return Err(ProvisionError::EmptyBaseline("apt"));
    }
    if baseline.pip.is_empty() {
        return Err(ProvisionError::EmptyBaseline("pip"));
    }

    let audio_gid = audio.audio_group_id()?;

    // Speech recognition pulls in its own fixed support packages.
    let mut extras = extras.clone();
    if !params.speech_locales.is_empty() {
        extras.apt.extend(catalog.apt_packages.iter().cloned());
        extras.pip.extend(catalog.pip_packages.iter().cloned());
    }

    let mut lines = Vec::new();
    lines.extend(base_image(&params.debian_version));
    lines.extend(apt_install(&baseline.apt, &extras.apt));
    lines.extend(locale_setup());
    lines.extend(timezone_setup(&params.timezone));
    lines.extend(pip_bootstrap());
    lines.extend(pip_install(&baseline.pip, &extras.pip));
    lines.extend(speech_models(&params.speech_locales, catalog));
    lines.extend(environment_setup(&params.shared_home, audio_gid));
    lines.extend(entrypoint(&params.profile_url));

    Ok(lines.join("\n") + "\n")
}

fn base_image(debian_version: &str) -> Vec<String> {
    vec![format!("FROM debian:{debian_version}"), String::new()]
}

fn apt_install(baseline: &[String], extras: &[String]) -> Vec<String> {
    let mut lines = vec![format!(
        "RUN apt-get update && apt-get install -y {}",
        baseline.join(" ")
    )];
    if !extras.is_empty() {
        lines.push(format!("RUN apt-get install -y {}", extras.join(" ")));
    }
    lines
}

fn locale_setup() -> Vec<String> {
    vec![
        format!("RUN locale-gen {IMAGE_LOCALE}"),
        "ENV LANG C.UTF-8".to_string(),
        String::new(),
    ]
}

fn timezone_setup(timezone: &str) -> Vec<String> {
    vec![
        format!("ENV TZ={}", quote(timezone)),
        "RUN ln -snf /usr/share/zoneinfo/$TZ /etc/localtime && echo $TZ > /etc/timezone"
            .to_string(),
        String::new(),
    ]
}

fn pip_bootstrap() -> Vec<String> {
    vec![
        "RUN curl https://bootstrap.pypa.io/get-pip.py -o get-pip.py \\".to_string(),
        "\t\t&& python get-pip.py".to_string(),
        String::new(),
    ]
}

fn pip_install(baseline: &[String], extras: &[String]) -> Vec<String> {
    let mut lines = vec![format!("RUN pip install {}", baseline.join(" "))];
    if !extras.is_empty() {
        lines.push(format!("RUN pip install {}", extras.join(" ")));
    }
    lines.push(String::new());
    lines
}

/// Download, extract and open up the acoustic model of every requested
/// locale the catalog knows. Unknown locales are silently skipped.
fn speech_models(locales: &[String], catalog: &SpeechModelCatalog) -> Vec<String> {
    if locales.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!("ENV SR_LIB={SPEECH_RECOGNITION_LIB}")];
    for locale in locales {
        let Some(url) = catalog.model_url(locale) else {
            continue;
        };
        lines.push(format!(
            "RUN wget {} -O \"$SR_LIB/{locale}.zip\"",
            quote(url)
        ));
        lines.push(format!("RUN unzip -o \"$SR_LIB/{locale}.zip\" -d \"$SR_LIB\""));
        lines.push(format!(
            "RUN chmod --recursive a+r \"$SR_LIB/pocketsphinx-data/{locale}/\""
        ));
    }
    lines
}

fn environment_setup(shared_home: &str, audio_gid: u32) -> Vec<String> {
    vec![
        format!("ENV HOME {}", quote(shared_home)),
        format!("RUN groupadd -g {audio_gid} {RUNTIME_USER}"),
        format!("RUN useradd -u {RUNTIME_UID} -g {audio_gid} --create-home {RUNTIME_USER}"),
        format!("RUN chown -R {RUNTIME_USER}:{RUNTIME_USER} $HOME"),
        String::new(),
    ]
}

fn entrypoint(profile_url: &str) -> Vec<String> {
    let profile = quote(repository_name(profile_url));
    vec![
        format!("WORKDIR $HOME/{profile}"),
        format!("USER {RUNTIME_USER}"),
        "CMD /bin/bash -c 'kalliope start'".to_string(),
    ]
}
