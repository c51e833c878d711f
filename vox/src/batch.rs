use std::path::{Path, PathBuf};

use voice::CreateModelRequest;
use vox_config::Config;

use crate::args::BatchArgs;

/// Run the create/synthesize flow against a local voice sample
///
/// The model cache is consulted first: a sample already seen (by basename)
/// reuses its model instead of creating a new one.
pub async fn run(args: BatchArgs) -> anyhow::Result<()> {
    let config = Config::load(&args.config)?;
    let server = voice::build_server(&config)?;

    let basename = args
        .voice_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow::anyhow!("voice file has no filename: {}", args.voice_file.display()))?;

    let model_id = match server.cache().get(&basename).await {
        Some(entry) => {
            println!("Using cached model: {}", entry.model_id);
            entry.model_id
        }
        None => {
            println!("Creating new model for {}...", args.voice_file.display());

            let audio = tokio::fs::read(&args.voice_file).await.map_err(|e| {
                anyhow::anyhow!("failed to read voice file {}: {e}", args.voice_file.display())
            })?;

            let request = CreateModelRequest::with_defaults(
                audio,
                basename,
                sample_content_type(&args.voice_file).to_string(),
            );

            let response = server.create_model(request).await?;
            println!("Model created and cached: {}", response.model_id);
            response.model_id
        }
    };

    let output = args.output.unwrap_or_else(|| {
        let prefix = model_id.get(..8).unwrap_or(&model_id);
        PathBuf::from(format!("speech_{prefix}.mp3"))
    });

    match server.synthesize_checked(&args.text, &model_id).await {
        Ok(audio) => {
            tokio::fs::write(&output, &audio)
                .await
                .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", output.display()))?;
            println!("Success! Speech written to {}", output.display());
            Ok(())
        }
        Err(e) => {
            println!("Failed to generate speech");
            Err(e.into())
        }
    }
}

fn sample_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        _ => "audio/mpeg",
    }
}
