/// Configuration for the feature MLP
///
/// Hidden width defaults to 150, the value used for Bibtex/Bookmarks.
/// Delicious-sized label sets usually get 250.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeatureMlpConfig {
    /// Input feature dimension
    pub dim_input: usize,

    /// Number of independent labels (output width)
    pub n_labels: usize,

    /// Width of both hidden layers
    #[serde(default = "default_hidden_units")]
    pub n_hidden_units: usize,

    /// Stop after the second hidden layer and return the hidden representation
    #[serde(default)]
    pub only_feature_extraction: bool,
}

fn default_hidden_units() -> usize {
    150
}

impl FeatureMlpConfig {
    /// Config with default hidden width and classification output
    pub fn new(dim_input: usize, n_labels: usize) -> Self {
        Self {
            dim_input,
            n_labels,
            n_hidden_units: default_hidden_units(),
            only_feature_extraction: false,
        }
    }

    /// Builder-style override of the hidden width
    pub fn with_hidden_units(mut self, n_hidden_units: usize) -> Self {
        self.n_hidden_units = n_hidden_units;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.dim_input == 0 {
            return Err(crate::MLPError::Config("dim_input must be > 0".to_string()));
        }

        if self.n_labels == 0 {
            return Err(crate::MLPError::Config("n_labels must be > 0".to_string()));
        }

        if self.n_hidden_units == 0 {
            return Err(crate::MLPError::Config(
                "n_hidden_units must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Width of the tensor returned by a forward pass in the current mode
    pub fn output_dim(&self) -> usize {
        if self.only_feature_extraction {
            self.n_hidden_units
        } else {
            self.n_labels
        }
    }
}
