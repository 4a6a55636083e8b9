use crate::core::config::data::Config;

impl Config {
    pub fn get_default_model(&self, provider: &str) -> Option<&String> {
        let normalized = provider.to_lowercase();
        self.default_models
            .get(&normalized)
            .or_else(|| self.default_models.get(provider))
    }

    pub fn set_default_model(&mut self, provider: &str, model: String) {
        let normalized = provider.to_lowercase();
        if normalized != provider {
            self.default_models.remove(provider);
        }
        self.default_models.insert(normalized, model);
    }

    pub fn unset_default_model(&mut self, provider: &str) {
        let normalized = provider.to_lowercase();
        self.default_models.remove(&normalized);
        if normalized != provider {
            self.default_models.remove(provider);
        }
    }

    /// Make `provider`/`model` the pair `voltx chat` opens without arguments.
    pub fn set_global_default(&mut self, provider: &str, model: String) {
        self.default_provider = Some(provider.to_lowercase());
        self.default_model = Some(model.clone());
        self.set_default_model(provider, model);
    }

    /// The global default pair, when both halves are set.
    pub fn global_default(&self) -> Option<(&str, &str)> {
        match (&self.default_provider, &self.default_model) {
            (Some(provider), Some(model)) => Some((provider.as_str(), model.as_str())),
            _ => None,
        }
    }

    pub fn reset_defaults(&mut self) {
        self.default_provider = None;
        self.default_model = None;
        self.default_models.clear();
    }

    /// Per-provider defaults sorted by provider id.
    pub fn sorted_default_models(&self) -> Vec<(&str, &str)> {
        let mut models: Vec<(&str, &str)> = self
            .default_models
            .iter()
            .map(|(p, m)| (p.as_str(), m.as_str()))
            .collect();
        models.sort();
        models
    }
}
