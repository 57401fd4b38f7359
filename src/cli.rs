use clap::{Parser, Subcommand};
use log::info;
use lyricgrade::{
    api,
    app::{self, ConfigBuilder},
    clients::{
        Catalog, ClassifierClient, Grader, SpotifyClient,
        entities::{GradeResponse, SearchResponse, Track},
        errors::{Error, Result},
    },
    session::{FacadeClient, Phase, SearchSession},
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "lyricgrade")]
#[command(version, about = "Search a song, fetch its lyrics and grade them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP facade
    Serve {
        #[arg(long, env = "PORT", default_value_t = 4000)]
        port: u16,
    },
    /// Search the catalog for tracks
    Search { query: String },
    /// Print the lyrics of a song
    Lyrics {
        #[arg(long)]
        artist: String,
        #[arg(long)]
        title: String,
    },
    /// Fetch the lyrics of a song and grade them
    Grade {
        #[arg(long)]
        artist: String,
        #[arg(long)]
        title: String,
    },
    /// Interactive search against a running facade
    Browse {
        #[arg(long, default_value = "http://localhost:4000")]
        server: String,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => serve(port).await,
        Commands::Search { query } => search(&query).await,
        Commands::Lyrics { artist, title } => {
            let lyrics = lyrics(&artist, &title).await?;
            println!("{lyrics}");
            Ok(())
        }
        Commands::Grade { artist, title } => grade(&artist, &title).await,
        Commands::Browse { server } => browse(server).await,
    }
}

async fn serve(port: u16) -> Result<()> {
    info!("Building config ...");
    let config = ConfigBuilder::new().build().await?;
    api::serve(config, port).await
}

async fn search(query: &str) -> Result<()> {
    let spotify = SpotifyClient::try_default(reqwest::Client::new())?;
    let response = SearchResponse::from_value(spotify.search_tracks(query).await?)?;
    print_tracks(&response.tracks.items);
    Ok(())
}

async fn lyrics(artist: &str, title: &str) -> Result<String> {
    let resolver = app::default_resolver(&reqwest::Client::new());
    resolver
        .resolve(artist, title)
        .await
        .ok_or_else(|| Error::LyricsNotFound {
            artist: artist.to_string(),
            title: title.to_string(),
        })
}

async fn grade(artist: &str, title: &str) -> Result<()> {
    let lyrics = lyrics(artist, title).await?;
    let classifier = ClassifierClient::try_default(reqwest::Client::new());
    let response: GradeResponse = serde_json::from_value(classifier.grade(&lyrics).await?)?;
    print_grades(&response.results);
    Ok(())
}

fn print_tracks(tracks: &[Track]) {
    if tracks.is_empty() {
        println!("No results");
    }
    for (i, track) in tracks.iter().enumerate() {
        println!("{:>2}. {} - {}", i + 1, track.name, track.artist_names());
    }
}

fn print_grades(grades: &[String]) {
    println!("Results:");
    for grade in grades {
        println!("  * {grade}");
    }
}

const BROWSE_HELP: &str = "Type to search, :<n> to pick a result, :g to grade, :c to clear, :q to quit";

async fn browse(server: String) -> Result<()> {
    let mut session = SearchSession::new(FacadeClient::new(reqwest::Client::new(), server));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{BROWSE_HELP}");
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            ":q" => break,
            ":c" => {
                session.clear();
                println!("Cleared");
            }
            ":g" => match session.grade().await {
                Some(grades) => print_grades(grades),
                None => println!("Select a song with lyrics first"),
            },
            command if command.starts_with(':') => {
                let Some(n) = command[1..].parse::<usize>().ok().filter(|n| *n > 0) else {
                    println!("{BROWSE_HELP}");
                    continue;
                };
                match session.select(n - 1).await {
                    Ok(track) => println!("{} - {}", track.name, track.artist_names()),
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                }
                match session.lyrics() {
                    Some(lyrics) => println!("\n{lyrics}\n"),
                    None => println!("Lyrics not found"),
                }
            }
            query => {
                session.set_input(query);
                session.settle().await;
                if session.phase() == Phase::Results {
                    print_tracks(session.results().unwrap_or_default());
                }
            }
        }
    }
    Ok(())
}
