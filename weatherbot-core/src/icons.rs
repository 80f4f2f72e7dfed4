use std::collections::HashMap;

/// Maps a weather category to the emoji appended to the temperature report.
#[derive(Debug, Clone)]
pub struct WeatherIcons {
    icons: HashMap<&'static str, &'static str>,
}

impl WeatherIcons {
    pub fn new() -> Self {
        let icons = HashMap::from([
            ("Thunderstorm", "☁☔⚡"),
            ("Drizzle", "☔"),
            ("Rain", "☁☔"),
            ("Snow", "❄"),
            ("Clear", "☀"),
            ("Clouds", "⛅"),
        ]);

        Self { icons }
    }

    /// Icon for `category`, or an empty string when there is none.
    pub fn icon_for(&self, category: &str) -> &'static str {
        self.icons.get(category).copied().unwrap_or("")
    }
}

impl Default for WeatherIcons {
    fn default() -> Self {
        Self::new()
    }
}
