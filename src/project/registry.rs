use std::collections::HashSet;

use crate::{
    foundation::error::{ReelError, ReelResult},
    project::model::{
        AssetSource, AudioAsset, MediaKind, MotionKind, Overlay, ProjectState, SceneAsset, Script,
    },
    timing::resolver::pair_voice_to_scenes,
};

/// What [`ProjectState::delete_scene`] removed.
#[derive(Clone, Debug, PartialEq)]
pub struct DeletedScene {
    /// The removed scene asset.
    pub scene: SceneAsset,
    /// Its paired voice-over, when one existed.
    pub voiceover: Option<AudioAsset>,
}

impl ProjectState {
    /// One empty scene slot per script scene, motion taken from the script's suggestion.
    pub fn from_script(script: Script) -> Self {
        let scene_assets = script
            .scenes
            .iter()
            .enumerate()
            .map(|(i, s)| SceneAsset {
                motion: s.suggested_motion.unwrap_or_default(),
                ..SceneAsset::empty(i as u32, s.visual_cue.clone())
            })
            .collect();
        Self {
            scene_assets,
            script: Some(script),
            ..Self::default()
        }
    }

    /// Check registry invariants.
    pub fn validate(&self) -> ReelResult<()> {
        for (pos, scene) in self.scene_assets.iter().enumerate() {
            if scene.scene_index as usize != pos {
                return Err(ReelError::validation(format!(
                    "scene at position {pos} has scene_index {}",
                    scene.scene_index
                )));
            }
        }

        let mut ids = HashSet::new();
        for track in &self.audio_tracks {
            if track.id.is_empty() {
                return Err(ReelError::validation("audio track id must be non-empty"));
            }
            if !ids.insert(track.id.as_str()) {
                return Err(ReelError::validation(format!(
                    "duplicate audio track id '{}'",
                    track.id
                )));
            }
            check_time("audio track duration", &track.id, track.duration_seconds)?;
            check_time("audio track start", &track.id, track.declared_start)?;
        }

        let mut overlay_ids = HashSet::new();
        for overlay in &self.overlays {
            if !overlay_ids.insert(overlay.id.as_str()) {
                return Err(ReelError::validation(format!(
                    "duplicate overlay id '{}'",
                    overlay.id
                )));
            }
            check_time("overlay start", &overlay.id, overlay.start_time)?;
            check_time("overlay duration", &overlay.id, overlay.duration_seconds)?;
            let p = overlay.position;
            if !(0.0..=100.0).contains(&p.x) || !(0.0..=100.0).contains(&p.y) {
                return Err(ReelError::validation(format!(
                    "overlay '{}' position must be within 0..=100",
                    overlay.id
                )));
            }
        }

        for (name, v) in [
            ("voice_volume", self.voice_volume),
            ("music_volume", self.music_volume),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(ReelError::validation(format!(
                    "{name} must be within 0..=1, got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Attach (or replace) the media of one scene.
    pub fn set_scene_media(
        &mut self,
        scene_index: u32,
        media_url: impl Into<String>,
        kind: MediaKind,
        source: Option<AssetSource>,
    ) -> ReelResult<()> {
        let scene = self.scene_mut(scene_index)?;
        scene.media_url = Some(media_url.into());
        scene.media_kind = kind;
        scene.source = source;
        Ok(())
    }

    /// Drop a scene's media, e.g. before regenerating it.
    pub fn clear_scene_media(&mut self, scene_index: u32) -> ReelResult<()> {
        self.scene_mut(scene_index)?.media_url = None;
        Ok(())
    }

    pub fn set_scene_motion(&mut self, scene_index: u32, motion: MotionKind) -> ReelResult<()> {
        self.scene_mut(scene_index)?.motion = motion;
        Ok(())
    }

    /// Scenes still at [`MotionKind::None`] take the script's suggested motion.
    ///
    /// Returns how many scenes changed.
    pub fn apply_suggested_motion(&mut self) -> usize {
        let Some(script) = &self.script else {
            return 0;
        };
        let mut changed = 0;
        for scene in &mut self.scene_assets {
            if scene.motion != MotionKind::None {
                continue;
            }
            if let Some(m) = script
                .scenes
                .get(scene.scene_index as usize)
                .and_then(|s| s.suggested_motion)
                && m != MotionKind::None
            {
                scene.motion = m;
                changed += 1;
            }
        }
        changed
    }

    /// Delete a scene together with its paired voice-over and script scene.
    ///
    /// The voice-over is found with [`pair_voice_to_scenes`], the same rule the timeline uses,
    /// so the remaining narration stays aligned with the remaining scenes.
    pub fn delete_scene(&mut self, scene_index: u32) -> ReelResult<DeletedScene> {
        let pos = scene_index as usize;
        if pos >= self.scene_assets.len() {
            return Err(ReelError::validation(format!(
                "no scene with index {scene_index}"
            )));
        }

        let pairing = pair_voice_to_scenes(&self.scene_assets, &self.audio_tracks);
        let voiceover = pairing.by_scene[pos].map(|i| self.audio_tracks.remove(i));

        let scene = self.scene_assets.remove(pos);
        for (i, s) in self.scene_assets.iter_mut().enumerate() {
            s.scene_index = i as u32;
        }
        if let Some(script) = &mut self.script
            && pos < script.scenes.len()
        {
            script.scenes.remove(pos);
        }

        tracing::debug!(
            scene_index,
            voiceover = voiceover.as_ref().map(|t| t.id.as_str()),
            "deleted scene"
        );
        Ok(DeletedScene { scene, voiceover })
    }

    pub fn add_audio_track(&mut self, track: AudioAsset) -> ReelResult<()> {
        if self.audio_tracks.iter().any(|t| t.id == track.id) {
            return Err(ReelError::validation(format!(
                "duplicate audio track id '{}'",
                track.id
            )));
        }
        check_time("audio track duration", &track.id, track.duration_seconds)?;
        check_time("audio track start", &track.id, track.declared_start)?;
        self.audio_tracks.push(track);
        Ok(())
    }

    pub fn remove_audio_track(&mut self, id: &str) -> Option<AudioAsset> {
        let pos = self.audio_tracks.iter().position(|t| t.id == id)?;
        Some(self.audio_tracks.remove(pos))
    }

    pub fn add_overlay(&mut self, overlay: Overlay) -> ReelResult<()> {
        if self.overlays.iter().any(|o| o.id == overlay.id) {
            return Err(ReelError::validation(format!(
                "duplicate overlay id '{}'",
                overlay.id
            )));
        }
        self.overlays.push(overlay);
        Ok(())
    }

    pub fn remove_overlay(&mut self, id: &str) -> Option<Overlay> {
        let pos = self.overlays.iter().position(|o| o.id == id)?;
        Some(self.overlays.remove(pos))
    }

    fn scene_mut(&mut self, scene_index: u32) -> ReelResult<&mut SceneAsset> {
        self.scene_assets
            .get_mut(scene_index as usize)
            .ok_or_else(|| ReelError::validation(format!("no scene with index {scene_index}")))
    }
}

fn check_time(what: &str, id: &str, v: f64) -> ReelResult<()> {
    if !v.is_finite() || v < 0.0 {
        return Err(ReelError::validation(format!(
            "{what} of '{id}' must be finite and >= 0, got {v}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/project/registry.rs"]
mod tests;
