//! Playlist codec
//!
//! Renders a resolved channel set into the extended-M3U dialect streaming
//! clients consume, and derives the canonical per-subscriber filename. Pure
//! string work, no I/O.

use crate::entities::{groups, users};
use crate::services::entitlement::ResolvedChannel;

pub struct PlaylistCodec {
    base_url: String,
}

impl PlaylistCodec {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Encode an ordered channel set into a playlist document.
    ///
    /// Each entry is an `#EXTINF` attribute line followed by the tokenized
    /// stream URL. Attributes appear in fixed order and only when the source
    /// value is non-empty; `"` inside attribute values becomes `\"`. The
    /// document always starts with `#EXTM3U` and ends with a newline.
    pub fn encode(&self, user: &users::Model, channels: &[ResolvedChannel]) -> String {
        let mut lines = vec!["#EXTM3U".to_string()];

        for resolved in channels {
            let channel = &resolved.channel;
            let mut attrs = Vec::new();

            let tvg_name = channel
                .tvg_name
                .as_deref()
                .or(channel.display_name.as_deref())
                .unwrap_or(&channel.stream_name);
            attrs.push(format!("tvg-name=\"{}\"", escape(tvg_name)));

            if let Some(tvg_id) = channel.tvg_id.as_deref().filter(|s| !s.is_empty()) {
                attrs.push(format!("tvg-id=\"{}\"", escape(tvg_id)));
            }

            if let Some(days) = channel.catchup_days.filter(|d| *d != 0) {
                attrs.push(format!("catchup-days=\"{days}\""));
            }

            if let Some(group_title) = group_title(&resolved.groups) {
                attrs.push(format!("group-title=\"{group_title}\""));
            }

            if let Some(logo) = channel.tvg_logo.as_deref().filter(|s| !s.is_empty()) {
                attrs.push(format!("tvg-logo=\"{logo}\""));
            }

            let display = channel
                .display_name
                .as_deref()
                .or(channel.tvg_name.as_deref())
                .unwrap_or(&channel.stream_name);

            lines.push(format!("#EXTINF:-1 {},{display}", attrs.join(" ")));
            lines.push(format!(
                "{}/{}/video.m3u8?token={}",
                self.base_url, channel.stream_name, user.token
            ));
        }

        lines.join("\n") + "\n"
    }

    /// Canonical playlist filename: `<last>_<first>_<agreement>.m3u8`
    pub fn filename(&self, user: &users::Model) -> String {
        format!(
            "{}_{}_{}.m3u8",
            sanitize(&user.last_name),
            sanitize(&user.first_name),
            sanitize(&user.agreement_number)
        )
    }

    /// Case-insensitive check whether a filename stem belongs to a subscriber
    pub fn matches_stem(&self, user: &users::Model, stem: &str) -> bool {
        self.filename(user).to_lowercase() == format!("{}.m3u8", stem.to_lowercase())
    }
}

/// Groups sorted by (sort_order, name case-insensitive), names comma-joined
fn group_title(groups: &[groups::Model]) -> Option<String> {
    let mut named: Vec<&groups::Model> = groups.iter().filter(|g| !g.name.is_empty()).collect();
    if named.is_empty() {
        return None;
    }
    named.sort_by(|a, b| {
        (a.sort_order, a.name.to_lowercase()).cmp(&(b.sort_order, b.name.to_lowercase()))
    });

    Some(
        named
            .iter()
            .map(|g| escape(&g.name))
            .collect::<Vec<_>>()
            .join(","),
    )
}

fn escape(value: &str) -> String {
    value.replace('"', "\\\"")
}

/// Spaces become `_`; everything outside alphanumeric, `_`, `-` is stripped
fn sanitize(value: &str) -> String {
    value
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::channels::{self, SyncStatus};
    use crate::entities::users::UserStatus;

    fn codec() -> PlaylistCodec {
        PlaylistCodec::new("http://media.example/")
    }

    fn user(first: &str, last: &str, agreement: &str) -> users::Model {
        let now = chrono::Utc::now();
        users::Model {
            id: 1,
            first_name: first.to_string(),
            last_name: last.to_string(),
            agreement_number: agreement.to_string(),
            status: UserStatus::Enabled,
            max_sessions: 1,
            token: "tok-123".to_string(),
            auth_token_id: None,
            valid_from: None,
            valid_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn channel(stream_name: &str) -> channels::Model {
        let now = chrono::Utc::now();
        channels::Model {
            id: 1,
            stream_name: stream_name.to_string(),
            tvg_name: None,
            display_name: None,
            catchup_days: None,
            tvg_id: None,
            tvg_logo: None,
            channel_number: None,
            sort_order: 0,
            sync_status: SyncStatus::Synced,
            last_seen_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn group(name: &str, sort_order: i32) -> groups::Model {
        let now = chrono::Utc::now();
        groups::Model {
            id: 1,
            name: name.to_string(),
            sort_order,
            created_at: now,
            updated_at: now,
        }
    }

    fn resolved(channel: channels::Model, groups: Vec<groups::Model>) -> ResolvedChannel {
        ResolvedChannel { channel, groups }
    }

    #[test]
    fn empty_entitlement_yields_header_only() {
        let content = codec().encode(&user("Jo", "Doe", "A-100"), &[]);
        assert_eq!(content, "#EXTM3U\n");
    }

    #[test]
    fn renders_full_attribute_set_in_order() {
        let mut ch = channel("sport1");
        ch.tvg_name = Some("Sport One".to_string());
        ch.display_name = Some("Sport 1 HD".to_string());
        ch.tvg_id = Some("sport1.example".to_string());
        ch.catchup_days = Some(7);
        ch.tvg_logo = Some("http://logo/s1.png".to_string());

        let content = codec().encode(
            &user("Jo", "Doe", "A-100"),
            &[resolved(ch, vec![group("Sports", 0)])],
        );

        assert_eq!(
            content,
            "#EXTM3U\n\
             #EXTINF:-1 tvg-name=\"Sport One\" tvg-id=\"sport1.example\" catchup-days=\"7\" group-title=\"Sports\" tvg-logo=\"http://logo/s1.png\",Sport 1 HD\n\
             http://media.example/sport1/video.m3u8?token=tok-123\n"
        );
    }

    #[test]
    fn falls_back_to_stream_name_for_names() {
        let content = codec().encode(&user("Jo", "Doe", "A-100"), &[resolved(channel("raw"), vec![])]);
        assert!(content.contains("tvg-name=\"raw\",raw\n"));
    }

    #[test]
    fn escapes_quotes_in_attribute_values() {
        let mut ch = channel("s1");
        ch.tvg_name = Some("Sport \"1\"".to_string());

        let content = codec().encode(&user("Jo", "Doe", "A-100"), &[resolved(ch, vec![])]);
        assert!(content.contains("tvg-name=\"Sport \\\"1\\\"\""));
    }

    #[test]
    fn zero_catchup_days_is_omitted() {
        let mut ch = channel("s1");
        ch.catchup_days = Some(0);

        let content = codec().encode(&user("Jo", "Doe", "A-100"), &[resolved(ch, vec![])]);
        assert!(!content.contains("catchup-days"));
    }

    #[test]
    fn groups_are_sorted_and_joined() {
        let groups = vec![group("zeta", 0), group("Alpha", 0), group("First", -1)];
        let content = codec().encode(
            &user("Jo", "Doe", "A-100"),
            &[resolved(channel("s1"), groups)],
        );
        assert!(content.contains("group-title=\"First,Alpha,zeta\""));
    }

    #[test]
    fn filename_is_sanitized() {
        let codec = codec();
        assert_eq!(
            codec.filename(&user("Jo", "Doe", "A-100")),
            "Doe_Jo_A-100.m3u8"
        );
        assert_eq!(
            codec.filename(&user("Mary Jane", "O'Neil", "X/2")),
            "ONeil_Mary_Jane_X2.m3u8"
        );
    }

    #[test]
    fn stem_matching_is_case_insensitive() {
        let codec = codec();
        let u = user("Jo", "Doe", "A-100");
        assert!(codec.matches_stem(&u, "doe_jo_a-100"));
        assert!(codec.matches_stem(&u, "Doe_Jo_A-100"));
        assert!(!codec.matches_stem(&u, "Doe_Jo_A-101"));
    }
}
