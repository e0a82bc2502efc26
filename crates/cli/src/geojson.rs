//! GeoJSON output of a layer map, and reading it back as a backup.
//!
//! One feature per layer, in draw order, with the layer name in
//! `properties.layer`. Coordinates stay in the map's projected CRS, which is
//! recorded in a top-level `crs` member.

use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde_json::{json, Map, Value};
use vistamap_core::{LayerMap, CRS};

fn position(c: Coord<f64>) -> Value {
    json!([c.x, c.y])
}

fn line(ls: &LineString<f64>) -> Value {
    Value::Array(ls.0.iter().map(|c| position(*c)).collect())
}

fn rings(p: &Polygon<f64>) -> Value {
    let mut rings = vec![line(p.exterior())];
    rings.extend(p.interiors().iter().map(line));
    Value::Array(rings)
}

/// GeoJSON geometry object for a geometry.
pub fn geometry_to_value(geom: &Geometry<f64>) -> Value {
    match geom {
        Geometry::Point(p) => json!({"type": "Point", "coordinates": position(p.0)}),
        Geometry::MultiPoint(mp) => json!({
            "type": "MultiPoint",
            "coordinates": mp.0.iter().map(|p| position(p.0)).collect::<Vec<_>>(),
        }),
        Geometry::Line(l) => json!({
            "type": "LineString",
            "coordinates": [position(l.start), position(l.end)],
        }),
        Geometry::LineString(ls) => json!({"type": "LineString", "coordinates": line(ls)}),
        Geometry::MultiLineString(mls) => json!({
            "type": "MultiLineString",
            "coordinates": mls.0.iter().map(line).collect::<Vec<_>>(),
        }),
        Geometry::Polygon(p) => json!({"type": "Polygon", "coordinates": rings(p)}),
        Geometry::MultiPolygon(mp) => json!({
            "type": "MultiPolygon",
            "coordinates": mp.0.iter().map(rings).collect::<Vec<_>>(),
        }),
        Geometry::Rect(r) => json!({"type": "Polygon", "coordinates": rings(&r.to_polygon())}),
        Geometry::Triangle(t) => json!({"type": "Polygon", "coordinates": rings(&t.to_polygon())}),
        Geometry::GeometryCollection(gc) => json!({
            "type": "GeometryCollection",
            "geometries": gc.0.iter().map(geometry_to_value).collect::<Vec<_>>(),
        }),
    }
}

/// FeatureCollection for a whole map.
pub fn layer_map_to_value(map: &LayerMap) -> Value {
    let features: Vec<Value> = map
        .iter()
        .map(|(name, geometry)| {
            json!({
                "type": "Feature",
                "properties": {"layer": name},
                "geometry": geometry_to_value(geometry),
            })
        })
        .collect();
    json!({
        "type": "FeatureCollection",
        "crs": {"type": "name", "properties": {"name": map.crs().identifier()}},
        "features": features,
    })
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

fn parse_position(value: &Value) -> Result<Coord<f64>> {
    match value.as_array().map(Vec::as_slice) {
        Some([x, y, ..]) => Ok(Coord {
            x: x.as_f64().ok_or_else(|| anyhow!("non-numeric x"))?,
            y: y.as_f64().ok_or_else(|| anyhow!("non-numeric y"))?,
        }),
        _ => bail!("invalid position: {value}"),
    }
}

fn array(value: &Value) -> Result<&Vec<Value>> {
    value.as_array().ok_or_else(|| anyhow!("expected an array, got {value}"))
}

fn parse_line(value: &Value) -> Result<LineString<f64>> {
    array(value)?.iter().map(parse_position).collect::<Result<Vec<_>>>().map(LineString::new)
}

fn parse_polygon(value: &Value) -> Result<Polygon<f64>> {
    let mut rings = array(value)?.iter().map(parse_line);
    let exterior = rings.next().ok_or_else(|| anyhow!("polygon without rings"))??;
    Ok(Polygon::new(exterior, rings.collect::<Result<Vec<_>>>()?))
}

/// Geometry from a GeoJSON geometry object.
pub fn value_to_geometry(value: &Value) -> Result<Geometry<f64>> {
    let kind = value["type"].as_str().ok_or_else(|| anyhow!("geometry without a type"))?;
    let coords = &value["coordinates"];
    Ok(match kind {
        "Point" => Geometry::Point(Point::from(parse_position(coords)?)),
        "MultiPoint" => Geometry::MultiPoint(MultiPoint::new(
            array(coords)?
                .iter()
                .map(|c| parse_position(c).map(Point::from))
                .collect::<Result<_>>()?,
        )),
        "LineString" => Geometry::LineString(parse_line(coords)?),
        "MultiLineString" => Geometry::MultiLineString(MultiLineString::new(
            array(coords)?.iter().map(parse_line).collect::<Result<_>>()?,
        )),
        "Polygon" => Geometry::Polygon(parse_polygon(coords)?),
        "MultiPolygon" => Geometry::MultiPolygon(MultiPolygon::new(
            array(coords)?.iter().map(parse_polygon).collect::<Result<_>>()?,
        )),
        "GeometryCollection" => Geometry::GeometryCollection(GeometryCollection::new_from(
            array(&value["geometries"])?
                .iter()
                .map(value_to_geometry)
                .collect::<Result<_>>()?,
        )),
        other => bail!("unsupported geometry type '{other}'"),
    })
}

fn parse_crs(value: &Value) -> Result<CRS> {
    let Some(name) = value["crs"]["properties"]["name"].as_str() else {
        return Ok(CRS::default());
    };
    let code = name
        .rsplit(':')
        .next()
        .and_then(|c| c.parse::<u32>().ok())
        .with_context(|| format!("unrecognised CRS '{name}'"))?;
    Ok(CRS::from_epsg(code))
}

/// Map previously written by [`layer_map_to_value`].
pub fn value_to_layer_map(value: &Value) -> Result<LayerMap> {
    let crs = parse_crs(value)?;
    let features = array(&value["features"]).context("not a FeatureCollection")?;
    let mut layers = Vec::with_capacity(features.len());
    for feature in features {
        let properties: &Map<String, Value> = feature["properties"]
            .as_object()
            .ok_or_else(|| anyhow!("feature without properties"))?;
        let name = properties
            .get("layer")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("feature without a 'layer' property"))?;
        let geometry = value_to_geometry(&feature["geometry"])
            .with_context(|| format!("layer '{name}'"))?;
        layers.push((name.to_string(), geometry));
    }
    Ok(LayerMap::from_layers(layers, crs)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon};

    fn sample() -> LayerMap {
        let mut map = LayerMap::new(
            polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)],
            CRS::utm(18, true),
        );
        map.insert(
            "streets",
            Geometry::MultiLineString(MultiLineString::new(vec![line_string![
                (x: 1.0, y: 1.0),
                (x: 9.0, y: 9.0)
            ]])),
        );
        map.insert("building", MultiPolygon::<f64>::new(vec![]));
        map
    }

    #[test]
    fn test_writes_one_feature_per_layer() {
        let value = layer_map_to_value(&sample());
        assert_eq!(value["crs"]["properties"]["name"], "EPSG:32618");
        let layers: Vec<_> = value["features"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["properties"]["layer"].as_str().unwrap())
            .collect();
        assert_eq!(layers, ["perimeter", "streets", "building"]);
        assert_eq!(value["features"][0]["geometry"]["type"], "Polygon");
    }

    #[test]
    fn test_backup_reads_back() {
        let map = sample();
        let read = value_to_layer_map(&layer_map_to_value(&map)).unwrap();
        assert_eq!(read, map);
    }

    #[test]
    fn test_backup_needs_perimeter() {
        let value = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"layer": "streets"},
                "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]},
            }],
        });
        assert!(value_to_layer_map(&value).is_err());
    }
}
