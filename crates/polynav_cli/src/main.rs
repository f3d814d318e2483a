//! Command line front end for `polynav`: loads a mesh, hit-tests points and prints routes.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use polynav::{FaceId, LoadConfig, Navmesh, Pick, Point, SearchConfig, Selection, VertexPlane};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Pathfinding queries on polygonal navmeshes
#[derive(Parser, Debug)]
#[command(name = "polynav", author, version, about, long_about = None)]
struct Cli {
    /// Log debug output of the library
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print vertex, face, portal and graph statistics of a mesh
    Info {
        #[command(flatten)]
        mesh: MeshArgs,
    },

    /// Print the face containing a point
    Locate {
        #[command(flatten)]
        mesh: MeshArgs,

        /// The point to look up (x,y)
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        at: Point,
    },

    /// Find a route between two points
    Route {
        #[command(flatten)]
        mesh: MeshArgs,

        /// Start position (x,y)
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        from: Point,

        /// Target position (x,y)
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        to: Point,

        /// Give up after expanding this many graph nodes
        #[arg(long)]
        max_expansions: Option<usize>,

        /// Print the route as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct MeshArgs {
    /// Mesh file (.obj)
    path: PathBuf,

    /// Factor applied to every vertex
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Offset added after scaling (x,y)
    #[arg(long, value_parser = parse_point, default_value = "0,0", allow_hyphen_values = true)]
    translate: Point,

    /// Which vertex fields hold the 2D position
    #[arg(long, value_enum, default_value_t = Plane::Xz)]
    plane: Plane,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Plane {
    /// First and third field, as exported by most 3D tools
    Xz,
    /// First and second field
    Xy,
}

impl From<Plane> for VertexPlane {
    fn from(plane: Plane) -> Self {
        match plane {
            Plane::Xz => VertexPlane::XZ,
            Plane::Xy => VertexPlane::XY,
        }
    }
}

impl MeshArgs {
    fn load_config(&self) -> LoadConfig {
        LoadConfig::default()
            .with_scale(self.scale)
            .with_translation(self.translate)
            .with_plane(self.plane.into())
    }

    fn load(&self) -> Result<Navmesh> {
        let navmesh = Navmesh::load(&self.path, &self.load_config())
            .with_context(|| format!("failed to load navmesh from {}", self.path.display()))?;
        info!(
            faces = navmesh.face_count(),
            portals = navmesh.portal_count(),
            "loaded {}",
            self.path.display()
        );
        Ok(navmesh)
    }
}

/// Parse a comma-separated 2D point
fn parse_point(s: &str) -> Result<Point, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return Err(format!("point must have 2 components, got {}", parts.len()));
    }
    let x = parts[0].trim().parse::<f64>().map_err(|e| e.to_string())?;
    let y = parts[1].trim().parse::<f64>().map_err(|e| e.to_string())?;
    if !x.is_finite() || !y.is_finite() {
        return Err(format!("point must be finite, got {s}"));
    }
    Ok(Point::new(x, y))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Command::Info { mesh } => info_command(&mesh),
        Command::Locate { mesh, at } => locate_command(&mesh, at),
        Command::Route {
            mesh,
            from,
            to,
            max_expansions,
            json,
        } => route_command(&mesh, from, to, max_expansions, json),
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let directive = if verbose {
        "polynav=debug"
    } else {
        "polynav=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn info_command(mesh: &MeshArgs) -> Result<()> {
    let navmesh = mesh.load()?;
    let graph = navmesh.graph();
    println!("mesh:        {}", mesh.path.display());
    println!("vertices:    {}", navmesh.vertices().len());
    println!("faces:       {}", navmesh.face_count());
    println!("portals:     {}", navmesh.portal_count());
    println!("graph nodes: {}", graph.node_count());
    println!("graph edges: {}", graph.edge_count());
    Ok(())
}

fn locate_command(mesh: &MeshArgs, at: Point) -> Result<()> {
    let navmesh = mesh.load()?;
    let Some(face_id) = navmesh.find_face_containing(at) else {
        bail!("{} is not on the navmesh", format_point(at));
    };
    let face = navmesh
        .face(face_id)
        .context("located face is missing from the navmesh")?;
    println!(
        "{} is in face {} ({} vertices, barycenter {})",
        format_point(at),
        face_id.index(),
        face.vertices().len(),
        format_point(face.barycenter())
    );
    Ok(())
}

#[derive(Serialize, Debug)]
struct RouteReport {
    start: Pick,
    target: Pick,
    /// `None` when the faces are not connected.
    cost: Option<f64>,
    waypoints: Vec<Point>,
}

fn route_command(
    mesh: &MeshArgs,
    from: Point,
    to: Point,
    max_expansions: Option<usize>,
    json: bool,
) -> Result<()> {
    let mut navmesh = mesh.load()?;
    navmesh.set_search_config(SearchConfig { max_expansions });

    let mut selection = Selection::new();
    selection
        .select_start(&mut navmesh, from)
        .with_context(|| format!("start {} is not on the navmesh", format_point(from)))?;
    selection
        .select_target(&mut navmesh, to)
        .with_context(|| format!("target {} is not on the navmesh", format_point(to)))?;
    let (Some(start), Some(target)) = (selection.start(), selection.target()) else {
        bail!("selection is incomplete");
    };

    let path = navmesh
        .find_path(interior_node(&navmesh, start.face)?, interior_node(&navmesh, target.face)?)
        .context("route search failed")?;
    debug!(expanded = path.expanded, "route search finished");

    let report = RouteReport {
        start,
        target,
        cost: (!path.is_empty()).then_some(path.total_cost),
        waypoints: navmesh.path_points(&path),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    let Some(cost) = report.cost else {
        println!("no path");
        return Ok(());
    };
    println!(
        "route from face {} to face {}: {} waypoints, cost {cost:.3}",
        start.face.index(),
        target.face.index(),
        report.waypoints.len()
    );
    for (i, point) in report.waypoints.iter().enumerate() {
        println!("{i:>4}: {}", format_point(*point));
    }
    Ok(())
}

fn interior_node(navmesh: &Navmesh, face: FaceId) -> Result<polynav::NodeId> {
    navmesh
        .face(face)
        .map(|face| face.interior_node())
        .with_context(|| format!("face {} is missing from the navmesh", face.index()))
}

fn format_point(point: Point) -> String {
    format!("({}, {})", point.x, point.y)
}
