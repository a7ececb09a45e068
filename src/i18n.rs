// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Runtime-selectable UI translation.
//!
//! Messages are keyed by their English text; [`tr`] returns the text for the
//! active language and falls back to the key. The language can be switched
//! at any time (`--language` does so after the preferences are read).

use std::sync::atomic::{AtomicU8, Ordering};

/// Languages with a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    German,
}

impl Language {
    /// Parse a two-letter code (`en`, `de`). Longer locale strings such as
    /// `de_DE.UTF-8` are accepted by their prefix.
    pub fn from_code(code: &str) -> Option<Self> {
        let prefix: String = code.chars().take(2).collect::<String>().to_lowercase();
        match prefix.as_str() {
            "en" => Some(Self::English),
            "de" => Some(Self::German),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::German => "de",
        }
    }
}

static CURRENT: AtomicU8 = AtomicU8::new(0);

/// Select the language for `code`; unknown codes select English.
/// Returns the language actually selected.
pub fn set_language(code: &str) -> Language {
    let lang = Language::from_code(code).unwrap_or(Language::English);
    CURRENT.store(lang as u8, Ordering::Relaxed);
    tracing::debug!(language = lang.code(), "ui language selected");
    lang
}

pub fn current_language() -> Language {
    match CURRENT.load(Ordering::Relaxed) {
        1 => Language::German,
        _ => Language::English,
    }
}

/// Translate `msg` into the active language.
pub fn tr(msg: &'static str) -> &'static str {
    match current_language() {
        Language::English => msg,
        Language::German => german(msg).unwrap_or(msg),
    }
}

fn german(msg: &str) -> Option<&'static str> {
    Some(match msg {
        " Command Line Interface" => " Kommandozeilen-Interface",
        "Downloads:" => "Downloads:",
        " Speed: " => " Geschwindigkeit: ",
        " Size: " => " Größe: ",
        " Finished in: " => " Fertig in: ",
        " ID: " => " ID: ",
        "waiting: " => "wartet: ",
        "Status:" => "Status:",
        "paused" => "pausiert",
        "running" => "läuft",
        "total Speed" => "Gesamtgeschwindigkeit",
        "Files in queue" => "Dateien in der Warteschlange",
        "Total" => "Gesamt",
        "Menu:" => "Menü:",
        " Add Links" => " Links hinzufügen",
        " Manage Queue" => " Warteschlange verwalten",
        " Manage Collector" => " Linksammler verwalten",
        " (Un)Pause Server" => " Server (de)pausieren",
        " Kill Server" => " Server beenden",
        " Quit" => " Beenden",
        " Input: " => " Eingabe: ",
        "Add Package:" => "Paket hinzufügen:",
        "Enter a name for the new package" => "Namen für das neue Paket eingeben",
        "Package: " => "Paket: ",
        "Parse the links you want to add." => "Links einfügen, die hinzugefügt werden sollen.",
        "Type END when done." => "END eingeben, wenn fertig.",
        "Links added: " => "Hinzugefügte Links: ",
        " back to main menu" => " zurück zum Hauptmenü",
        "Manage Packages:" => "Pakete verwalten:",
        "Manage Links:" => "Links verwalten:",
        "What do you want to move?" => "Was soll verschoben werden?",
        "What do you want to delete?" => "Was soll gelöscht werden?",
        "What do you want to restart?" => "Was soll neu gestartet werden?",
        "Enter a single number, comma separated numbers or ranges. e.g.: 1,2,3 or 1-3." => {
            "Eine Zahl, kommagetrennte Zahlen oder Bereiche eingeben, z.B.: 1,2,3 oder 1-3."
        }
        "Choose what you want to do, or enter package number." => {
            "Aktion wählen oder Paketnummer eingeben."
        }
        "delete" => "löschen",
        "move" => "verschieben",
        "restart" => "neu starten",
        " - previous" => " - zurück",
        " - next" => " - weiter",
        "pyLoad was terminated" => "pyLoad wurde beendet",
        "No downloads running." => "Keine laufenden Downloads.",
        "Please use this syntax:" => "Bitte diese Syntax verwenden:",
        "Checking %d links:" => "Prüfe %d Links:",
        "Package added." => "Paket hinzugefügt.",
        "Files deleted." => "Dateien gelöscht.",
        "Packages deleted." => "Pakete gelöscht.",
        "Packages moved." => "Pakete verschoben.",
        "Links cannot be moved, only packages." => "Links können nicht verschoben werden, nur Pakete.",
        "Files restarted." => "Dateien neu gestartet.",
        "Packages restarted." => "Pakete neu gestartet.",
        "Server paused." => "Server pausiert.",
        "Server unpaused." => "Server fortgesetzt.",
        "Prints server status" => "Zeigt den Serverstatus",
        "Prints downloads in queue" => "Zeigt die Downloads in der Warteschlange",
        "Prints downloads in collector" => "Zeigt die Downloads im Linksammler",
        "Adds package to queue" => "Fügt ein Paket zur Warteschlange hinzu",
        "Adds package to collector" => "Fügt ein Paket zum Linksammler hinzu",
        "Delete Files from Queue/Collector" => "Löscht Dateien aus Warteschlange/Linksammler",
        "Delete Packages from Queue/Collector" => "Löscht Pakete aus Warteschlange/Linksammler",
        "Move Packages from Queue to Collector or vice versa" => {
            "Verschiebt Pakete zwischen Warteschlange und Linksammler"
        }
        "Restart files" => "Startet Dateien neu",
        "Restart packages" => "Startet Pakete neu",
        "Check online status, works with local container" => {
            "Prüft den Online-Status, auch mit lokalem Container"
        }
        "Checks online status of a container file" => "Prüft den Online-Status einer Containerdatei",
        "Pause the server" => "Pausiert den Server",
        "continue downloads" => "Setzt die Downloads fort",
        "Toggle pause/unpause" => "Schaltet Pause um",
        "kill server" => "Beendet den Server",
        "File does not exist." => "Datei existiert nicht.",
        "List of commands:" => "Liste der Befehle:",
        "Login data is wrong." => "Logindaten sind falsch.",
        "Couldn't write user config file" => "Konnte die Benutzerkonfiguration nicht schreiben",
        "Interactive mode ignored since you passed some commands." => {
            "Interaktiver Modus ignoriert, da Befehle übergeben wurden."
        }
        "Address: " => "Adresse: ",
        "Port: " => "Port: ",
        "Username: " => "Benutzername: ",
        "Password: " => "Passwort: ",
        _ => return None,
    })
}
