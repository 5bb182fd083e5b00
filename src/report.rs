// src/report.rs
//! HTML email report: today's insights, trending themes, cultural
//! highlights, and the B2C/B2B idea sections. Inline styles only; email
//! clients ignore everything else.

use std::fmt::Write as _;

use crate::ai::{ContentIdea, CulturalHighlight, IdeaBatch};

const B2C_ACCENT: &str = "#ff6b35";
const B2B_ACCENT: &str = "#3498db";

fn idea_card(idx: usize, idea: &ContentIdea, accent: &str) -> String {
    let mut steps = String::new();
    for step in &idea.execution_steps {
        let _ = write!(steps, "<li>{}</li>", step);
    }

    format!(
        r#"<div style="border-left: 4px solid {accent}; padding: 20px; margin-bottom: 20px; border-radius: 8px; background: #fafafa;">
  <h3 style="color: #2c3e50; margin: 0 0 10px 0;">
    <span style="background: {accent}; color: white; padding: 4px 12px; border-radius: 20px; font-size: 14px; margin-right: 10px;">#{idx}</span>
    {title}
  </h3>
  <p style="margin: 10px 0; color: #7f8c8d;"><strong>Format:</strong> {format} | <strong>Platform:</strong> {platform}</p>
  <p style="margin: 10px 0; color: #34495e;"><strong>Concept:</strong> {concept}</p>
  <ol style="margin: 10px 0; padding-left: 20px; color: #34495e;">{steps}</ol>
  <p style="margin: 10px 0; padding: 10px; background: #fff; border-radius: 4px; font-size: 14px;"><strong>Why it works:</strong> {why}</p>
</div>"#,
        title = idea.title,
        format = or_na(&idea.format),
        platform = or_na(&idea.platform),
        concept = or_na(&idea.concept),
        why = or_na(&idea.why_it_works),
    )
}

fn or_na(s: &str) -> &str {
    if s.is_empty() {
        "N/A"
    } else {
        s
    }
}

fn highlight_rows(highlights: &[CulturalHighlight]) -> String {
    let mut out = String::new();
    for h in highlights {
        let _ = write!(
            out,
            r#"<li style="margin-bottom: 8px;"><strong>{}</strong> — {} <em>({})</em></li>"#,
            h.trend,
            or_na(&h.opportunity),
            or_na(&h.urgency)
        );
    }
    out
}

fn section(title: &str, subtitle: &str, accent: &str, ideas: &[ContentIdea]) -> String {
    let mut cards = String::new();
    for (i, idea) in ideas.iter().enumerate() {
        cards.push_str(&idea_card(i + 1, idea, accent));
    }
    format!(
        r#"<div style="margin-bottom: 40px;">
  <div style="background: {accent}; padding: 20px; border-radius: 8px; margin-bottom: 20px;">
    <h2 style="color: white; margin: 0; font-size: 24px;">{title}</h2>
    <p style="color: rgba(255,255,255,0.9); margin: 5px 0 0 0;">{subtitle}</p>
  </div>
  {cards}
</div>"#
    )
}

/// Render the full report document.
pub fn build_html_report(batch: &IdeaBatch) -> String {
    let mut themes = String::new();
    for theme in &batch.trending_themes {
        let _ = write!(
            themes,
            r#"<span style="background: #9b59b6; color: white; padding: 6px 16px; border-radius: 20px; margin: 5px; display: inline-block;">{}</span>"#,
            theme
        );
    }

    let highlights = if batch.cultural_highlights.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div style="margin-bottom: 30px;">
  <h2 style="color: #2c3e50; font-size: 20px;">Cultural Highlights</h2>
  <ul style="padding-left: 20px; color: #34495e;">{}</ul>
</div>"#,
            highlight_rows(&batch.cultural_highlights)
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><meta name="viewport" content="width=device-width, initial-scale=1.0"></head>
<body style="font-family: -apple-system, 'Segoe UI', Roboto, Arial, sans-serif; line-height: 1.6; color: #333; max-width: 900px; margin: 0 auto; padding: 20px;">
  <div style="background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); padding: 40px 30px; border-radius: 12px; text-align: center; margin-bottom: 30px;">
    <h1 style="color: white; margin: 0; font-size: 32px;">Daily Content Ideas</h1>
    <p style="color: rgba(255,255,255,0.9); margin: 10px 0 0 0;">B2C + B2B Content Strategy</p>
  </div>
  <div style="background: #fff3cd; border-left: 4px solid #ffc107; padding: 20px; margin-bottom: 30px; border-radius: 8px;">
    <h2 style="color: #856404; margin: 0 0 10px 0; font-size: 18px;">Today's Insights</h2>
    <p style="color: #856404; margin: 0; font-size: 15px;">{insights}</p>
  </div>
  <div style="margin-bottom: 30px;">
    <h2 style="color: #2c3e50; margin: 0 0 15px 0; font-size: 20px;">Trending Themes</h2>
    <div>{themes}</div>
  </div>
  {highlights}
  {b2c}
  {b2b}
  <div style="text-align: center; padding: 30px 20px; border-top: 2px solid #ecf0f1; margin-top: 40px;">
    <p style="color: #95a5a6; font-size: 14px; margin: 0;">Generated by HomeMade Meals Trend Radar</p>
  </div>
</body>
</html>"#,
        insights = batch.key_insights,
        b2c = section(
            "B2C Content (For Customers)",
            "Drive orders and attract hungry customers",
            B2C_ACCENT,
            &batch.b2c_content_ideas,
        ),
        b2b = section(
            "B2B Content (For Chefs)",
            "Inspire chefs to join the platform",
            B2B_ACCENT,
            &batch.b2b_content_ideas,
        ),
    )
}
