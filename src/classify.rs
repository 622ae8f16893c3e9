//! # Image Type Classifier
//!
//! Assegna a ogni immagine un tipo (avatar, project, icon, gallery) in base al
//! nome del file e della directory che lo contiene. Il tipo decide quale riga
//! della tabella qualità viene usata per l'encoding.
//!
//! ## Regole (in ordine di priorità, case-insensitive):
//! 1. Il nome file contiene `avatar` o `photo` → `Avatar`
//! 2. Il percorso della directory contiene `project` → `Project`
//! 3. Il nome file o la directory contengono `icon` → `Icon`
//! 4. Altrimenti → `Gallery`
//!
//! L'euristica è puramente basata sui nomi e l'ordine delle regole va
//! preservato: cambiarlo cambia le qualità applicate.

use std::fmt;
use std::path::Path;

/// Category of a source image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    Avatar,
    Project,
    Icon,
    Gallery,
}

impl ImageType {
    pub const ALL: [ImageType; 4] = [
        ImageType::Avatar,
        ImageType::Project,
        ImageType::Icon,
        ImageType::Gallery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::Avatar => "avatar",
            ImageType::Project => "project",
            ImageType::Icon => "icon",
            ImageType::Gallery => "gallery",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an image from its path.
///
/// The walker passes paths relative to the source root, so only the
/// directories below the root take part in the directory rules.
pub fn classify(path: &Path) -> ImageType {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let dir_name = path
        .parent()
        .map(|dir| dir.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if file_name.contains("avatar") || file_name.contains("photo") {
        ImageType::Avatar
    } else if dir_name.contains("project") {
        ImageType::Project
    } else if file_name.contains("icon") || dir_name.contains("icon") {
        ImageType::Icon
    } else {
        ImageType::Gallery
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avatar_wins_regardless_of_directory() {
        assert_eq!(classify(Path::new("IMG_avatar_01.png")), ImageType::Avatar);
        assert_eq!(classify(Path::new("projects/IMG_avatar_01.png")), ImageType::Avatar);
        assert_eq!(classify(Path::new("icons/Profile-Photo.JPG")), ImageType::Avatar);
    }

    #[test]
    fn test_project_directory() {
        assert_eq!(classify(Path::new("projects/shot.png")), ImageType::Project);
        assert_eq!(classify(Path::new("Project/demo.png")), ImageType::Project);
        // directory rule beats the icon rule
        assert_eq!(classify(Path::new("project/icon-github.png")), ImageType::Project);
    }

    #[test]
    fn test_icon_by_name_or_directory() {
        assert_eq!(classify(Path::new("icon-close.svg")), ImageType::Icon);
        assert_eq!(classify(Path::new("ui/icons/close.png")), ImageType::Icon);
        assert_eq!(classify(Path::new("Favicon.PNG")), ImageType::Icon);
    }

    #[test]
    fn test_gallery_default() {
        assert_eq!(classify(Path::new("hero-background.jpg")), ImageType::Gallery);
        assert_eq!(classify(Path::new("misc/team.webp")), ImageType::Gallery);
        assert_eq!(classify(Path::new("")), ImageType::Gallery);
    }

    #[test]
    fn test_classification_is_stable() {
        let path = Path::new("projects/shot.png");
        assert_eq!(classify(path), classify(path));
    }

    #[test]
    fn test_display() {
        assert_eq!(ImageType::Project.to_string(), "project");
        assert_eq!(ImageType::ALL.len(), 4);
    }
}
