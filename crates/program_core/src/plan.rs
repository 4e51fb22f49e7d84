use crate::conference::ConferenceSnapshot;

/// Pages exported for every conference, as `(source, target)` pairs.
pub const WHOLE_PROGRAM_PAGES: [(&str, &str); 9] = [
    ("schedule", "schedule.html"),
    ("events", "events.html"),
    ("speakers", "speakers.html"),
    ("speakers.json", "speakers.json"),
    ("schedule/style.css", "style.css"),
    ("schedule.ics", "schedule.ics"),
    ("schedule.xcal", "schedule.xcal"),
    ("schedule.json", "schedule.json"),
    ("schedule.xml", "schedule.xml"),
];

/// One planned page: where the renderer serves it and where the export stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpec {
    source: String,
    target: String,
}

impl PathSpec {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Path relative to `/<locale>/<acronym>/public/`.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Path relative to the export directory.
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// Enumerate every page of the export in a stable order.
///
/// Days are indexed by start date (ties keep snapshot order), events and
/// speakers are ordered by id.
pub fn plan_paths(snapshot: &ConferenceSnapshot) -> Vec<PathSpec> {
    let mut paths: Vec<PathSpec> = WHOLE_PROGRAM_PAGES
        .iter()
        .map(|(source, target)| PathSpec::new(*source, *target))
        .collect();

    let mut days: Vec<_> = snapshot.days.iter().collect();
    days.sort_by_key(|day| day.start_date);
    for (index, _day) in days.iter().enumerate() {
        paths.push(PathSpec::new(
            format!("schedule/{index}"),
            format!("schedule/{index}.html"),
        ));
        paths.push(PathSpec::new(
            format!("schedule/{index}.pdf"),
            format!("schedule/{index}.pdf"),
        ));
    }

    let mut events: Vec<_> = snapshot
        .events
        .iter()
        .filter(|event| event.is_exported())
        .collect();
    events.sort_by_key(|event| event.id);
    for event in events {
        let id = event.id;
        paths.push(PathSpec::new(
            format!("events/{id}"),
            format!("events/{id}.html"),
        ));
        paths.push(PathSpec::new(
            format!("events/{id}.ics"),
            format!("events/{id}.ics"),
        ));
    }

    let mut speakers: Vec<_> = snapshot
        .people
        .iter()
        .filter(|person| snapshot.speaks_publicly(person))
        .collect();
    speakers.sort_by_key(|person| person.id);
    for speaker in speakers {
        let id = speaker.id;
        paths.push(PathSpec::new(
            format!("speakers/{id}"),
            format!("speakers/{id}.html"),
        ));
    }

    paths
}

/// Path on the renderer for a planned source, with an optional locale prefix.
pub fn renderer_path(acronym: &str, locale: Option<&str>, source: &str) -> String {
    match locale {
        Some(locale) => format!("/{locale}/{acronym}/public/{source}"),
        None => format!("/{acronym}/public/{source}"),
    }
}

#[cfg(test)]
mod tests {
    use super::renderer_path;

    #[test]
    fn renderer_path_without_locale() {
        assert_eq!(
            renderer_path("acme2024", None, "schedule.ics"),
            "/acme2024/public/schedule.ics"
        );
    }

    #[test]
    fn renderer_path_with_locale() {
        assert_eq!(
            renderer_path("acme2024", Some("de"), "schedule/0"),
            "/de/acme2024/public/schedule/0"
        );
    }
}
