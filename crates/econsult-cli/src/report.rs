//! Plain-text tables for the read-only commands.

use std::io::{self, Write};

use econsult_analysis::{AspectBucket, LanguageStats, Summary, TimelineBucket, WordCloud};

pub(crate) fn write_summary(out: &mut impl Write, summary: &Summary) -> io::Result<()> {
    writeln!(
        out,
        "{:<10}{:<10}{:<10}NEGATIVE",
        "TOTAL", "POSITIVE", "NEUTRAL"
    )?;
    writeln!(
        out,
        "{:<10}{:<10}{:<10}{}",
        summary.total, summary.positive, summary.neutral, summary.negative
    )
}

pub(crate) fn write_timeline(out: &mut impl Write, buckets: &[TimelineBucket]) -> io::Result<()> {
    if buckets.is_empty() {
        return writeln!(out, "no comments in the requested range");
    }

    writeln!(
        out,
        "{:<12}{:<10}{:<10}{:<10}TOTAL",
        "DATE", "POSITIVE", "NEUTRAL", "NEGATIVE"
    )?;
    for bucket in buckets {
        let counts = bucket.counts;
        writeln!(
            out,
            "{:<12}{:<10}{:<10}{:<10}{}",
            bucket.date.format("%Y-%m-%d").to_string(),
            counts.positive,
            counts.neutral,
            counts.negative,
            counts.total()
        )?;
    }
    Ok(())
}

pub(crate) fn write_aspects(out: &mut impl Write, aspects: &[AspectBucket]) -> io::Result<()> {
    if aspects.is_empty() {
        return writeln!(out, "no aspects recorded");
    }

    let width = aspects
        .iter()
        .map(|a| a.aspect.chars().count())
        .max()
        .unwrap_or(0)
        .max("ASPECT".len())
        + 2;

    writeln!(
        out,
        "{:<width$}{:<10}{:<10}{:<10}TOTAL",
        "ASPECT", "POSITIVE", "NEUTRAL", "NEGATIVE"
    )?;
    for bucket in aspects {
        let counts = bucket.counts;
        writeln!(
            out,
            "{:<width$}{:<10}{:<10}{:<10}{}",
            bucket.aspect,
            counts.positive,
            counts.neutral,
            counts.negative,
            counts.total()
        )?;
    }
    Ok(())
}

pub(crate) fn write_languages(
    out: &mut impl Write,
    stats: &LanguageStats,
    threshold: u64,
) -> io::Result<()> {
    if stats.language_counts.is_empty() {
        return writeln!(out, "no comments stored");
    }

    writeln!(out, "{:<12}{:<10}FLAG", "LANGUAGE", "COMMENTS")?;
    for (language, count) in &stats.language_counts {
        let flag = if stats.underrepresented.contains(language) {
            "underrepresented"
        } else {
            ""
        };
        writeln!(out, "{language:<12}{count:<10}{flag}")?;
    }

    writeln!(out)?;
    if stats.underrepresented.is_empty() {
        writeln!(out, "no language has fewer than {threshold} comments")
    } else {
        writeln!(
            out,
            "underrepresented (< {threshold}): {}",
            stats.underrepresented.join(", ")
        )
    }
}

pub(crate) fn write_wordcloud(out: &mut impl Write, cloud: &WordCloud) -> io::Result<()> {
    if cloud.is_empty() {
        return writeln!(out, "no words to show");
    }

    writeln!(out, "{:<24}{:<10}SENTIMENT", "WORD", "COUNT")?;
    for entry in &cloud.entries {
        writeln!(out, "{:<24}{:<10}{}", entry.word, entry.count, entry.sentiment)?;
    }
    Ok(())
}
