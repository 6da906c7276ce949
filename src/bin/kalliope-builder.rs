use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use kalliope_builder::config::{default_config_path, Config};
use kalliope_builder::dockerfile::{self, BuildParams, SpeechModelCatalog};
use kalliope_builder::packages::{builtin_baseline, load_baseline, PackageSet};
use kalliope_builder::pipeline::{stage_profile, CachePaths};
use kalliope_builder::{engine, preflight, GitCli, HostGroups};

fn usage() -> &'static str {
    "Usage:\n  kalliope-builder [-c <config>] setup download\n  kalliope-builder [-c <config>] setup clear\n  kalliope-builder [-c <config>] image build\n  kalliope-builder [-c <config>] image remove\n  kalliope-builder [-c <config>] container run [--shell]\n  kalliope-builder [-c <config>] container stop"
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let has_config_flag = matches!(
        args.first().map(String::as_str),
        Some("-c") | Some("--configuration-file")
    );
    let config_path = if has_config_flag {
        if args.len() < 2 {
            bail!(usage());
        }
        let path = PathBuf::from(args.remove(1));
        args.remove(0);
        path
    } else {
        default_config_path()
    };
    let config = Config::load(&config_path)?;

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["setup", "download"] => setup_download(&config),
        ["setup", "clear"] => {
            engine::clear_cache(&config.base_directory)?;
            println!("[setup] cache cleared: {}", config.base_directory.display());
            Ok(())
        }
        ["image", "build"] => {
            engine::build_image(&config.base_directory, &config.dockerfile, &config.image_tag)?;
            println!("[image] built {}", config.image_tag);
            Ok(())
        }
        ["image", "remove"] => {
            engine::remove_image(&config.image_tag)?;
            println!("[image] removed {}", config.image_tag);
            Ok(())
        }
        ["container", "run"] | ["container", "run", "--shell"] => {
            let interactive = args.last().map(String::as_str) == Some("--shell");
            engine::run_container(
                &config.base_directory,
                &config.image_files_directory,
                &config.shared_home_directory,
                &config.image_tag,
                interactive,
            )?;
            Ok(())
        }
        ["container", "stop"] => {
            engine::stop_containers(&config.image_tag)?;
            println!("[container] stopped {}", config.image_tag);
            Ok(())
        }
        _ => bail!(usage()),
    }
}

/// Fetch everything, render the Dockerfile, write it under the cache.
fn setup_download(config: &Config) -> Result<()> {
    preflight::check_host_tools()?;

    fs::create_dir_all(&config.base_directory).with_context(|| {
        format!(
            "creating cache directory '{}'",
            config.base_directory.display()
        )
    })?;

    let paths = CachePaths::new(&config.base_directory, &config.image_files_directory);

    println!("[setup] fetching profile {}", config.profile_url);
    let aggregation = stage_profile(&paths, &config.profile_url, &config.resource_urls, &GitCli)?;
    for skipped in &aggregation.skipped {
        println!("[setup] skipped {}: {}", skipped.url, skipped.error);
    }

    let baseline = load_configured_baseline(config)?;

    let params = BuildParams {
        debian_version: config.debian_version.clone(),
        timezone: config.timezone.clone(),
        shared_home: config.shared_home_directory.clone(),
        profile_url: config.profile_url.clone(),
        speech_locales: config.speech_locales.clone(),
    };
    let rendered = dockerfile::render(
        &baseline,
        &aggregation.extras,
        &params,
        &SpeechModelCatalog::builtin(),
        &HostGroups,
    )?;

    let dockerfile_path = paths.dockerfile(&config.dockerfile);
    fs::write(&dockerfile_path, rendered)
        .with_context(|| format!("writing '{}'", dockerfile_path.display()))?;

    println!("[setup] Dockerfile written to {}", dockerfile_path.display());
    Ok(())
}

/// Baseline package lists: configured override files, or the built-in copies.
fn load_configured_baseline(config: &Config) -> Result<PackageSet> {
    match (&config.apt_requirements, &config.pip_requirements) {
        (Some(apt), Some(pip)) => {
            load_baseline(apt, pip).context("loading baseline package list overrides")
        }
        (None, None) => Ok(builtin_baseline()),
        _ => bail!("apt_requirements and pip_requirements must be configured together"),
    }
}
