//! `soundcloud` command-line client.

pub mod cli;
pub mod config;
pub mod login;
pub mod token_store;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use soundcloud_api::Pager;
use soundcloud_api::SoundCloudApi;
use soundcloud_api::TrackQuery;
use soundcloud_api::models::Track;

use crate::cli::Cli;
use crate::cli::Command;
use crate::cli::SearchArgs;
use crate::cli::TracksSubcommand;
use crate::config::Config;
use crate::token_store::TokenStore;

pub async fn run_main(cli: Cli) -> Result<()> {
    let home = config::find_home(cli.home)?;
    let config = Config::load(home).context("failed to load configuration")?;
    let store = TokenStore::in_home(&config.home);

    match cli.command {
        Command::Login(args) => {
            login::run_login(&config, Duration::from_secs(args.timeout_secs)).await?;
            println!("Logged in. Token saved to {}", store.path().display());
        }
        Command::Logout => {
            if store.clear()? {
                println!("Logged out.");
            } else {
                println!("Not logged in.");
            }
        }
        Command::Me => {
            let api = authenticated_api(&config, &store)?;
            let me = api.me().await?;
            println!("{}", serde_json::to_string_pretty(&me)?);
        }
        Command::Tracks(tracks) => match tracks.command {
            TracksSubcommand::Search(args) => search_tracks(&config, &store, args).await?,
        },
    }

    Ok(())
}

fn authenticated_api(config: &Config, store: &TokenStore) -> Result<Arc<SoundCloudApi>> {
    let api = login::build_api(config)?;
    let token = store
        .load()?
        .context("not logged in; run `soundcloud login` first")?;
    api.set_token(token.access_token);
    Ok(api)
}

async fn search_tracks(config: &Config, store: &TokenStore, args: SearchArgs) -> Result<()> {
    let api = login::build_api(config)?;
    if let Some(token) = store.load()? {
        api.set_token(token.access_token);
    }

    let query = TrackQuery::builder()
        .query(args.query)
        .limit(args.limit)
        .build();
    let mut pager = Pager::with_page_size(&query, args.limit);
    pager.set_offset(i64::from(args.page) * i64::from(pager.limit()));

    let tracks = api.search_tracks_with(pager.map()).await?;
    tracing::debug!(count = tracks.len(), offset = pager.offset(), "search finished");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tracks)?);
    } else {
        for track in &tracks {
            println!("{}", format_track(track));
        }
    }
    Ok(())
}

fn format_track(track: &Track) -> String {
    let id = track.id.as_ref().map(ToString::to_string).unwrap_or_default();
    let title = track.title.as_deref().unwrap_or("(untitled)");
    let user = track
        .user
        .as_ref()
        .and_then(|user| user.username.as_deref())
        .unwrap_or("-");
    format!("{id}\t{title}\t{user}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn track_rows_tolerate_missing_fields() {
        let track: Track =
            serde_json::from_str(r#"{"id": 5, "title": "Dawn", "user": {"username": "ana"}}"#)
                .unwrap();
        assert_eq!(format_track(&track), "5\tDawn\tana");
        assert_eq!(format_track(&Track::default()), "\t(untitled)\t-");
    }
}
