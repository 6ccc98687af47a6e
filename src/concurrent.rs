//! Concurrent chunked parsing of large files.
//!
//! The file is split into fixed-size byte ranges and every range gets its
//! own worker with a private scanner and parser over an independently
//! seeked handle. A chunk's nominal start offset almost never falls on a
//! game boundary, so every worker except the first resynchronizes forward
//! with [`Parser::recover`] before parsing. A worker always finishes the
//! game it is inside when it crosses its nominal end offset; the next
//! worker's recovery scan skips past that same game, so every game is
//! claimed by exactly one chunk.

use std::{
    fs::File,
    io::{self, Seek, SeekFrom},
    path::Path,
    thread,
    time::{Duration, Instant},
};

use crate::{game::Game, parser::Parser};

/// A chunk is sized so one worker has roughly a second of work: an estimate
/// of games parsed per second times average bytes per game.
const GAMES_PER_CHUNK: u64 = 100_000;
const BYTES_PER_GAME: u64 = 800;
const CHUNK_SIZE: u64 = GAMES_PER_CHUNK * BYTES_PER_GAME;

const DEADLINE: Duration = Duration::from_secs(100);

/// Parses the file at `path` by splitting it into byte-range chunks parsed
/// in parallel.
///
/// Returns the merged games of every chunk, in no particular order. Unlike
/// [`parse`](crate::parse), per-game failures are not aggregated for the
/// caller: each is logged and the game is skipped, trading error detail for
/// throughput. Chunks that have not reported when the deadline elapses are
/// silently dropped.
pub fn parse_concurrent<P: AsRef<Path>>(path: P) -> io::Result<Vec<Game>> {
    parse_concurrent_chunked(path, CHUNK_SIZE)
}

/// Like [`parse_concurrent`], with an explicit chunk size in bytes. Mainly
/// useful for tuning and for exercising chunk resynchronization on small
/// inputs.
pub fn parse_concurrent_chunked<P: AsRef<Path>>(
    path: P,
    chunk_size: u64,
) -> io::Result<Vec<Game>> {
    let path = path.as_ref().to_path_buf();
    let len = std::fs::metadata(&path)?.len();
    let num_chunks = (len / chunk_size) as usize + 1;

    let (sender, receiver) = crossbeam_channel::unbounded();

    for index in 0..num_chunks {
        let sender = sender.clone();
        let path = path.clone();
        let start = index as u64 * chunk_size;

        thread::spawn(move || {
            let games = parse_chunk(&path, start, chunk_size).unwrap_or_else(|err| {
                tracing::warn!(chunk = index, error = %err, "abandoning chunk");
                Vec::new()
            });
            // The orchestrator may have given up on this chunk already.
            let _ = sender.send(games);
        });
    }
    drop(sender);

    let deadline = Instant::now() + DEADLINE;
    let mut games = Vec::new();
    let mut reported = 0;

    while reported < num_chunks {
        match receiver.recv_deadline(deadline) {
            Ok(chunk_games) => {
                games.extend(chunk_games);
                reported += 1;
            }
            // Deadline elapsed (or a worker died); in-flight chunks are
            // lost, the merge so far still counts.
            Err(_) => break,
        }
    }

    Ok(games)
}

/// Parses one chunk: seek to the nominal start, resynchronize onto a true
/// game boundary, then parse games until end of input or until the cursor
/// has moved `chunk_size` bytes past the seek point. The end check runs
/// only between games.
fn parse_chunk(path: &Path, start: u64, chunk_size: u64) -> io::Result<Vec<Game>> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(start))?;

    let mut parser = Parser::from_reader(file);
    parser.recover(start == 0)?;

    let mut games = Vec::new();
    loop {
        if parser.at_end()? || parser.position().offset > chunk_size {
            return Ok(games);
        }

        match parser.parse_game() {
            Ok(game) => games.push(game),
            Err(err) => {
                tracing::warn!(error = %err.error, "skipping unparsable game");
                parser.recover(false)?;
            }
        }
    }
}
