// ============================================================================
// Module : ui
// ============================================================================
// Interface terminal : formulaire, tableau, graphique et barre d'état
// ============================================================================

pub mod chart;     // Graphique ligne du Close
pub mod dashboard; // Rendu de l'interface principale
pub mod events;    // Gestion des événements clavier

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};
