//! The fixed list of feeds polled on every run.
//!
//! | Source | Format |
//! |--------|--------|
//! | OpenAI Blog | RSS |
//! | Google DeepMind | RSS |
//! | Anthropic | RSS |
//! | MIT Technology Review - AI | RSS |
//! | VentureBeat AI | RSS |
//! | Synced Review | RSS |
//! | Hugging Face Blog | RSS |
//! | The Verge - AI | Atom |
//! | NVIDIA Blog - AI | RSS |
//!
//! Sources are processed in this order, which is also the tie-break order
//! for entries that share a timestamp.

use crate::models::FeedSource;

pub const FEED_SOURCES: &[FeedSource] = &[
    FeedSource {
        name: "OpenAI Blog",
        url: "https://openai.com/blog/rss.xml",
    },
    FeedSource {
        name: "Google DeepMind",
        url: "https://deepmind.google/blog/rss.xml",
    },
    FeedSource {
        name: "Anthropic",
        url: "https://www.anthropic.com/news/rss.xml",
    },
    FeedSource {
        name: "MIT Technology Review - AI",
        url: "https://www.technologyreview.com/topic/artificial-intelligence/feed",
    },
    FeedSource {
        name: "VentureBeat AI",
        url: "https://venturebeat.com/category/ai/feed/",
    },
    FeedSource {
        name: "Synced Review",
        url: "https://syncedreview.com/feed/",
    },
    FeedSource {
        name: "Hugging Face Blog",
        url: "https://huggingface.co/blog/feed.xml",
    },
    FeedSource {
        name: "The Verge - AI",
        url: "https://www.theverge.com/ai-artificial-intelligence/rss/index.xml",
    },
    FeedSource {
        name: "NVIDIA Blog - AI",
        url: "https://blogs.nvidia.com/blog/category/ai/feed/",
    },
];
