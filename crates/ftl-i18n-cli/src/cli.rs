use std::path::PathBuf;

use thiserror::Error;

use crate::command_build::{BuildCommandError, BuildOptions, run_build};
use crate::command_check::{CheckCommandError, CheckOptions, run_check};
use crate::command_flatten::{FlattenCommandError, FlattenCommandOptions, run_flatten};
use crate::command_format::{FormatCommandError, FormatOptions, run_format};
use crate::command_parse::{ParseCommandError, ParseOptions, run_parse};
use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Debug, Error)]
pub enum CliAppError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Check(#[from] CheckCommandError),
    #[error(transparent)]
    Format(#[from] FormatCommandError),
    #[error(transparent)]
    Flatten(#[from] FlattenCommandError),
    #[error(transparent)]
    Parse(#[from] ParseCommandError),
    #[error(transparent)]
    Build(#[from] BuildCommandError),
}

pub fn run(args: Vec<String>) -> Result<(), CliAppError> {
    let mut args = args.into_iter();
    let command = args.next().ok_or_else(|| CliAppError::Usage(usage()))?;
    match command.as_str() {
        "check" => {
            let options = parse_check_options(args.collect())?;
            run_check(&options)?;
            Ok(())
        }
        "format" => {
            let options = parse_format_options(args.collect())?;
            run_format(&options)?;
            Ok(())
        }
        "flatten" => {
            let options = parse_flatten_options(args.collect())?;
            run_flatten(&options)?;
            Ok(())
        }
        "parse" => {
            let options = parse_parse_options(args.collect())?;
            run_parse(&options)?;
            Ok(())
        }
        "build" => {
            let options = parse_build_options(args.collect())?;
            run_build(&options)?;
            Ok(())
        }
        _ => Err(CliAppError::Usage(usage())),
    }
}

fn parse_check_options(args: Vec<String>) -> Result<CheckOptions, CliAppError> {
    let mut input = None;
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--input" => input = Some(PathBuf::from(next_value("--input", &mut iter)?)),
            "--config" => config_path = PathBuf::from(next_value("--config", &mut iter)?),
            _ => return Err(CliAppError::Usage(usage())),
        }
    }
    let input = input.ok_or_else(|| CliAppError::Usage(usage()))?;
    Ok(CheckOptions { input, config_path })
}

fn parse_format_options(args: Vec<String>) -> Result<FormatOptions, CliAppError> {
    let mut input = None;
    let mut out = None;
    let mut with_junk = false;
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--input" => input = Some(PathBuf::from(next_value("--input", &mut iter)?)),
            "--out" => out = Some(PathBuf::from(next_value("--out", &mut iter)?)),
            "--with-junk" => with_junk = true,
            "--config" => config_path = PathBuf::from(next_value("--config", &mut iter)?),
            _ => return Err(CliAppError::Usage(usage())),
        }
    }
    let input = input.ok_or_else(|| CliAppError::Usage(usage()))?;
    Ok(FormatOptions {
        input,
        out,
        with_junk,
        config_path,
    })
}

fn parse_flatten_options(args: Vec<String>) -> Result<FlattenCommandOptions, CliAppError> {
    let mut input = None;
    let mut out = None;
    let mut no_comments = false;
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--input" => input = Some(PathBuf::from(next_value("--input", &mut iter)?)),
            "--out" => out = Some(PathBuf::from(next_value("--out", &mut iter)?)),
            "--no-comments" => no_comments = true,
            "--config" => config_path = PathBuf::from(next_value("--config", &mut iter)?),
            _ => return Err(CliAppError::Usage(usage())),
        }
    }
    let input = input.ok_or_else(|| CliAppError::Usage(usage()))?;
    Ok(FlattenCommandOptions {
        input,
        out,
        no_comments,
        config_path,
    })
}

fn parse_parse_options(args: Vec<String>) -> Result<ParseOptions, CliAppError> {
    let mut input = None;
    let mut out = None;
    let mut no_spans = false;
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--input" => input = Some(PathBuf::from(next_value("--input", &mut iter)?)),
            "--out" => out = Some(PathBuf::from(next_value("--out", &mut iter)?)),
            "--no-spans" => no_spans = true,
            "--config" => config_path = PathBuf::from(next_value("--config", &mut iter)?),
            _ => return Err(CliAppError::Usage(usage())),
        }
    }
    let input = input.ok_or_else(|| CliAppError::Usage(usage()))?;
    Ok(ParseOptions {
        input,
        out,
        no_spans,
        config_path,
    })
}

fn parse_build_options(args: Vec<String>) -> Result<BuildOptions, CliAppError> {
    let mut out_dir = PathBuf::from("i18n-build");
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--out" => out_dir = PathBuf::from(next_value("--out", &mut iter)?),
            "--config" => config_path = PathBuf::from(next_value("--config", &mut iter)?),
            _ => return Err(CliAppError::Usage(usage())),
        }
    }
    Ok(BuildOptions {
        config_path,
        out_dir,
    })
}

fn next_value(flag: &str, iter: &mut impl Iterator<Item = String>) -> Result<String, CliAppError> {
    iter.next()
        .ok_or_else(|| CliAppError::Usage(format!("{flag} requires a value\n\n{}", usage())))
}

fn usage() -> String {
    "usage: ftl-i18n-cli check --input <file> [--config <path>]\n       ftl-i18n-cli format --input <file> [--out <file>] [--with-junk] [--config <path>]\n       ftl-i18n-cli flatten --input <file> [--out <file>] [--no-comments] [--config <path>]\n       ftl-i18n-cli parse --input <file> [--out <file>] [--no-spans] [--config <path>]\n       ftl-i18n-cli build [--out <dir>] [--config <path>]".to_string()
}
