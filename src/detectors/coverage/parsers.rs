use crate::core::errors::{CoverError, Result};
use crate::detectors::coverage::types::{Block, CoverMode, Profile, SourcePosition};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

const MODE_PREFIX: &str = "mode: ";

/// Parse a Go coverage profile file into per-file profiles sorted by file name.
pub fn parse_profiles(path: &Path) -> Result<Vec<Profile>> {
    let content = fs::read_to_string(path).map_err(|err| {
        CoverError::io(
            format!("Failed to read coverage profile at {}", path.display()),
            err,
        )
    })?;

    parse_profiles_from_str(&content, path)
}

/// Parse profile text; `origin` is only used in error messages.
pub fn parse_profiles_from_str(content: &str, origin: &Path) -> Result<Vec<Profile>> {
    let mut mode: Option<CoverMode> = None;
    let mut files: BTreeMap<String, Vec<Block>> = BTreeMap::new();

    for (index, raw_line) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        if let Some(declared) = line.strip_prefix(MODE_PREFIX) {
            let parsed = parse_mode(declared, origin, line_number)?;
            match mode {
                None => mode = Some(parsed),
                Some(current) if current == parsed => {}
                Some(current) => {
                    return Err(CoverError::profile_parse_at(
                        origin,
                        line_number,
                        format!("mode changed from {current} to {parsed}"),
                    ));
                }
            }
            continue;
        }

        if mode.is_none() {
            return Err(CoverError::profile_parse_at(
                origin,
                line_number,
                format!("bad mode line: {line}"),
            ));
        }

        let (file_name, block) = parse_block_line(line).map_err(|message| {
            CoverError::profile_parse_at(
                origin,
                line_number,
                format!("line {line:?} doesn't match expected format: {message}"),
            )
        })?;
        files.entry(file_name.to_string()).or_default().push(block);
    }

    let Some(mode) = mode else {
        return Err(CoverError::profile_parse(origin, "missing mode line"));
    };

    let mut profiles = Vec::with_capacity(files.len());
    for (file_name, blocks) in files {
        let mut profile = Profile::new(file_name, mode, blocks);
        profile
            .merge_duplicate_blocks()
            .map_err(|(previous, current)| {
                CoverError::profile_parse(
                    origin,
                    format!(
                        "inconsistent statement count in {}: changed from {previous} to {current}",
                        profile.file_name()
                    ),
                )
            })?;
        profiles.push(profile);
    }

    debug!(
        "Parsed {} profiles ({} mode) from {}",
        profiles.len(),
        mode,
        origin.display()
    );
    Ok(profiles)
}

fn parse_mode(declared: &str, origin: &Path, line_number: usize) -> Result<CoverMode> {
    declared
        .parse::<CoverMode>()
        .map_err(|message| CoverError::profile_parse_at(origin, line_number, message))
}

/// Parse `file:startLine.startCol,endLine.endCol numStmt count`.
///
/// Fields are taken from the right so file names may contain `:`.
fn parse_block_line(line: &str) -> std::result::Result<(&str, Block), String> {
    let (rest, count) = line
        .rsplit_once(' ')
        .ok_or_else(|| "missing execution count".to_string())?;
    let (rest, statements) = rest
        .rsplit_once(' ')
        .ok_or_else(|| "missing statement count".to_string())?;
    let (file_name, span) = rest
        .rsplit_once(':')
        .ok_or_else(|| "missing file name separator".to_string())?;
    if file_name.is_empty() {
        return Err("empty file name".to_string());
    }

    let (start, end) = span
        .split_once(',')
        .ok_or_else(|| format!("malformed span {span:?}"))?;

    let block = Block::new(
        parse_position(start)?,
        parse_position(end)?,
        parse_number(statements, "statement count")?,
        parse_number(count, "execution count")?,
    );
    Ok((file_name, block))
}

fn parse_position(text: &str) -> std::result::Result<SourcePosition, String> {
    let (line, column) = text
        .split_once('.')
        .ok_or_else(|| format!("malformed position {text:?}"))?;
    let line = parse_number(line, "line")?;
    let column = parse_number(column, "column")?;
    Ok(SourcePosition::new(line as usize, column as usize))
}

/// Fields are bounded to `u32`, the width the Go toolchain writes, so summed
/// statement totals stay far below `u64::MAX`.
fn parse_number(text: &str, what: &str) -> std::result::Result<u64, String> {
    text.parse::<u32>()
        .map(u64::from)
        .map_err(|err| format!("invalid {what} {text:?}: {err}"))
}
