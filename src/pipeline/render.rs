//! Batch image rendering.
//!
//! Prompts are split into fixed-size batches. Requests inside a batch run
//! together and are joined before the next batch starts, so at most
//! `batch_size` image requests are ever in flight. Output order follows
//! prompt order; a slide whose request fails or returns no payload is left
//! out and recorded in [`RenderStats::dropped`].

use crate::error::SlideError;
use crate::output::{GeneratedImage, ImagePrompt, RenderStats};
use crate::progress::ProgressCallback;
use crate::service::ImageGenerator;
use futures::future::join_all;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Render one image for one slide. Never fails the batch.
async fn render_slide(
    generator: &dyn ImageGenerator,
    slide: usize,
    total: usize,
    prompt: &str,
    progress: Option<&ProgressCallback>,
) -> Result<GeneratedImage, SlideError> {
    if let Some(cb) = progress {
        cb.on_slide_start(slide, total);
    }
    let start = Instant::now();

    let result = match generator.generate_image(prompt).await {
        Ok(response) => match response.first_image() {
            Some(data) => Ok(GeneratedImage {
                slide,
                prompt: prompt.to_string(),
                data,
            }),
            None => Err(SlideError::EmptyPayload { slide }),
        },
        Err(e) => Err(SlideError::RequestFailed {
            slide,
            detail: e.to_string(),
        }),
    };

    match &result {
        Ok(_) => {
            debug!("Slide {}/{} rendered in {:?}", slide, total, start.elapsed());
            if let Some(cb) = progress {
                cb.on_slide_complete(slide, total);
            }
        }
        Err(e) => {
            warn!("Dropping slide {}/{}: {}", slide, total, e);
            if let Some(cb) = progress {
                cb.on_slide_error(slide, total, &e.to_string());
            }
        }
    }
    result
}

/// Render every prompt, `batch_size` at a time.
pub async fn render_all(
    generator: &dyn ImageGenerator,
    prompts: &[ImagePrompt],
    batch_size: usize,
    progress: Option<&ProgressCallback>,
) -> (Vec<GeneratedImage>, RenderStats) {
    let total = prompts.len();
    let batch_size = batch_size.max(1);
    let start = Instant::now();

    let mut images = Vec::with_capacity(total);
    let mut dropped = Vec::new();

    for (batch_idx, batch) in prompts.chunks(batch_size).enumerate() {
        let offset = batch_idx * batch_size;
        debug!("Batch {}: slides {}..={}", batch_idx + 1, offset + 1, offset + batch.len());

        let results = join_all(batch.iter().enumerate().map(|(i, prompt)| {
            render_slide(generator, offset + i + 1, total, prompt, progress)
        }))
        .await;

        for result in results {
            match result {
                Ok(image) => images.push(image),
                Err(e) => dropped.push(e),
            }
        }
    }

    let stats = RenderStats {
        requested: total,
        rendered: images.len(),
        dropped,
    };
    info!(
        "Rendered {}/{} slides in {:?}",
        stats.rendered,
        stats.requested,
        start.elapsed()
    );
    if let Some(cb) = progress {
        cb.on_render_complete(stats.requested, stats.rendered);
    }
    (images, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LinkpostError;
    use crate::service::ImageResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Echoes the prompt as the payload; fails or returns nothing on request.
    #[derive(Default)]
    struct Scripted {
        fail_on: Vec<&'static str>,
        empty_on: Vec<&'static str>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ImageGenerator for Scripted {
        async fn generate_image(&self, prompt: &str) -> Result<ImageResponse, LinkpostError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            // Later prompts finish first, so order cannot come from completion.
            let delay = 70u64.saturating_sub(prompt.bytes().next().unwrap_or(b'F') as u64) * 5;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_on.iter().any(|p| *p == prompt) {
                return Err(LinkpostError::upstream(
                    crate::error::Service::ImageGeneration,
                    Some(500),
                    "boom",
                ));
            }
            if self.empty_on.iter().any(|p| *p == prompt) {
                return Ok(ImageResponse::default());
            }
            Ok(ImageResponse {
                images: vec![format!("img{prompt}")],
            })
        }
    }

    fn prompts() -> Vec<String> {
        ["A", "B", "C", "D", "E", "F"].iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn failure_omits_slide_and_keeps_order() {
        let generator = Scripted {
            fail_on: vec!["C"],
            ..Default::default()
        };
        let (images, stats) = render_all(&generator, &prompts(), 3, None).await;

        let payloads: Vec<&str> = images.iter().map(|i| i.data.as_str()).collect();
        assert_eq!(payloads, vec!["imgA", "imgB", "imgD", "imgE", "imgF"]);
        let slides: Vec<usize> = images.iter().map(|i| i.slide).collect();
        assert_eq!(slides, vec![1, 2, 4, 5, 6]);
        assert_eq!(stats.requested, 6);
        assert_eq!(stats.rendered, 5);
        assert_eq!(stats.dropped.len(), 1);
        assert_eq!(stats.dropped[0].slide(), 3);
    }

    #[tokio::test]
    async fn empty_payload_is_dropped() {
        let generator = Scripted {
            empty_on: vec!["A", "F"],
            ..Default::default()
        };
        let (images, stats) = render_all(&generator, &prompts(), 3, None).await;
        assert_eq!(images.len(), 4);
        assert_eq!(
            stats.dropped,
            vec![
                SlideError::EmptyPayload { slide: 1 },
                SlideError::EmptyPayload { slide: 6 }
            ]
        );
    }

    #[tokio::test]
    async fn batches_bound_concurrency() {
        let generator = Scripted::default();
        let (images, _) = render_all(&generator, &prompts(), 3, None).await;
        assert_eq!(images.len(), 6);
        assert!(generator.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn progress_sees_every_slide() {
        use crate::progress::GenerationProgressCallback;
        use std::sync::Arc;

        #[derive(Default)]
        struct Counts {
            ok: AtomicUsize,
            err: AtomicUsize,
            done: AtomicUsize,
        }
        impl GenerationProgressCallback for Counts {
            fn on_slide_complete(&self, _slide: usize, _total: usize) {
                self.ok.fetch_add(1, Ordering::SeqCst);
            }
            fn on_slide_error(&self, _slide: usize, _total: usize, _error: &str) {
                self.err.fetch_add(1, Ordering::SeqCst);
            }
            fn on_render_complete(&self, _requested: usize, rendered: usize) {
                self.done.store(rendered, Ordering::SeqCst);
            }
        }

        let counts = Arc::new(Counts::default());
        let cb: ProgressCallback = counts.clone();
        let generator = Scripted {
            fail_on: vec!["B"],
            ..Default::default()
        };
        render_all(&generator, &prompts(), 2, Some(&cb)).await;
        assert_eq!(counts.ok.load(Ordering::SeqCst), 5);
        assert_eq!(counts.err.load(Ordering::SeqCst), 1);
        assert_eq!(counts.done.load(Ordering::SeqCst), 5);
    }
}
