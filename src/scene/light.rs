use glam::Vec3;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct HemisphereLight {
    /// Colour from below; the light's main colour is the sky colour
    pub ground_color: Vec3,
}

#[derive(Debug, Clone)]
pub struct DirectionalLight {
    /// World-space point the light is aimed at
    pub target: Vec3,
}

#[derive(Debug, Clone)]
pub struct PointLight {
    pub range: f32,
}

#[derive(Debug, Clone)]
pub struct SpotLight {
    pub range: f32,
    pub inner_cone: f32,
    pub outer_cone: f32,
}

#[derive(Debug, Clone)]
pub enum LightKind {
    Ambient,
    Hemisphere(HemisphereLight),
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

impl LightKind {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            LightKind::Ambient => "AmbientLight",
            LightKind::Hemisphere(_) => "HemisphereLight",
            LightKind::Directional(_) => "DirectionalLight",
            LightKind::Point(_) => "PointLight",
            LightKind::Spot(_) => "SpotLight",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Light {
    pub uuid: Uuid,
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
    pub cast_shadows: bool,
}

impl Light {
    fn with_kind(color: Vec3, intensity: f32, kind: LightKind) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            color,
            intensity,
            kind,
            cast_shadows: false,
        }
    }

    #[must_use]
    pub fn new_ambient(color: Vec3, intensity: f32) -> Self {
        Self::with_kind(color, intensity, LightKind::Ambient)
    }

    #[must_use]
    pub fn new_hemisphere(sky_color: Vec3, ground_color: Vec3, intensity: f32) -> Self {
        Self::with_kind(
            sky_color,
            intensity,
            LightKind::Hemisphere(HemisphereLight { ground_color }),
        )
    }

    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32) -> Self {
        Self::with_kind(
            color,
            intensity,
            LightKind::Directional(DirectionalLight { target: Vec3::ZERO }),
        )
    }

    #[must_use]
    pub fn new_point(color: Vec3, intensity: f32, range: f32) -> Self {
        Self::with_kind(color, intensity, LightKind::Point(PointLight { range }))
    }

    #[must_use]
    pub fn new_spot(
        color: Vec3,
        intensity: f32,
        range: f32,
        inner_cone: f32,
        outer_cone: f32,
    ) -> Self {
        Self::with_kind(
            color,
            intensity,
            LightKind::Spot(SpotLight {
                range,
                inner_cone,
                outer_cone,
            }),
        )
    }

    /// Ground colour for hemisphere lights.
    #[must_use]
    pub fn ground_color(&self) -> Option<Vec3> {
        match &self.kind {
            LightKind::Hemisphere(h) => Some(h.ground_color),
            _ => None,
        }
    }
}
